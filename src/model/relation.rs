// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;
use thiserror::Error;

use super::appellation::{Entity, Provenance};
use super::ids::{AppellationId, DateAppellationId, RelationId, TemplateId};
use super::position::TextRange;

/// What kind of data a relation template field accepts.
///
/// The two-letter wire codes (`TP`, `CO`, `DT`) only appear in [`FieldKind::code`] and
/// [`FieldKind::from_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A concept appellation.
    Concept,
    /// A raw character-offset text position.
    TextPosition,
    /// A date appellation.
    Date,
}

impl FieldKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Concept => "TP",
            Self::TextPosition => "CO",
            Self::Date => "DT",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FieldKind {
    type Err = ParseFieldKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TP" => Ok(Self::Concept),
            "CO" => Ok(Self::TextPosition),
            "DT" => Ok(Self::Date),
            other => Err(ParseFieldKindError(SmolStr::new(other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown relation field type '{0}' (expected TP, CO or DT)")]
pub struct ParseFieldKindError(SmolStr);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    label: SmolStr,
    kind: FieldKind,
    concept_type: Option<SmolStr>,
}

impl TemplateField {
    pub fn new(label: impl AsRef<str>, kind: FieldKind) -> Self {
        Self { label: SmolStr::new(label), kind, concept_type: None }
    }

    pub fn with_concept_type(mut self, concept_type: impl AsRef<str>) -> Self {
        self.concept_type = Some(SmolStr::new(concept_type));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Concept type an appellation bound here is expected to carry, if the template says so.
    pub fn concept_type(&self) -> Option<&str> {
        self.concept_type.as_deref()
    }
}

/// Named, ordered schema a relation must satisfy before it can be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTemplate {
    id: TemplateId,
    name: SmolStr,
    description: Option<String>,
    fields: Vec<TemplateField>,
}

impl RelationTemplate {
    pub fn new(id: TemplateId, name: impl AsRef<str>, fields: Vec<TemplateField>) -> Self {
        Self { id, name: SmolStr::new(name), description: None, fields }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> TemplateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&TemplateField> {
        self.fields.get(index)
    }
}

/// Data bound to one template field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldData {
    Appellation(AppellationId),
    TextPosition(TextRange),
    Date(DateAppellationId),
}

impl FieldData {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Appellation(_) => FieldKind::Concept,
            Self::TextPosition(_) => FieldKind::TextPosition,
            Self::Date(_) => FieldKind::Date,
        }
    }
}

/// Optional temporal qualification of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemporalBounds {
    pub started: Option<DateAppellationId>,
    pub ended: Option<DateAppellationId>,
    pub occurred: Option<DateAppellationId>,
}

impl TemporalBounds {
    pub fn is_empty(&self) -> bool {
        self.started.is_none() && self.ended.is_none() && self.occurred.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = DateAppellationId> + '_ {
        [self.started, self.ended, self.occurred].into_iter().flatten()
    }
}

/// A templated link between appellations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    id: RelationId,
    template: TemplateId,
    appellations: Vec<AppellationId>,
    date_appellations: Vec<DateAppellationId>,
    representation: String,
    temporal: TemporalBounds,
    visible: bool,
    selected: bool,
    provenance: Provenance,
}

impl Relation {
    pub fn new(
        id: RelationId,
        template: TemplateId,
        appellations: Vec<AppellationId>,
        date_appellations: Vec<DateAppellationId>,
        representation: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            id,
            template,
            appellations,
            date_appellations,
            representation: representation.into(),
            temporal: TemporalBounds::default(),
            visible: true,
            selected: false,
            provenance,
        }
    }

    pub fn with_temporal(mut self, temporal: TemporalBounds) -> Self {
        self.temporal = temporal;
        self
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn appellations(&self) -> &[AppellationId] {
        &self.appellations
    }

    pub fn date_appellations(&self) -> &[DateAppellationId] {
        &self.date_appellations
    }

    pub fn representation(&self) -> &str {
        &self.representation
    }

    pub fn temporal(&self) -> TemporalBounds {
        self.temporal
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn references_appellation(&self, id: AppellationId) -> bool {
        self.appellations.contains(&id)
    }
}

impl Entity for Relation {
    type Id = RelationId;

    fn id(&self) -> RelationId {
        self.id
    }

    fn index_key(&self) -> Option<SmolStr> {
        Some(SmolStr::new(self.template.to_string()))
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}
