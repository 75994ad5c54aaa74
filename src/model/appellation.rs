// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use smol_str::SmolStr;

use super::concept::ConceptRef;
use super::date::DateRepresentation;
use super::ids::{AppellationId, DateAppellationId};
use super::position::CharSpan;

/// Behaviour shared by every annotation kind held in the in-memory collections.
pub trait Entity: Clone + fmt::Debug {
    type Id: Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display;

    fn id(&self) -> Self::Id;

    /// Key of the secondary index (concept URI, date string, template id).
    fn index_key(&self) -> Option<SmolStr>;

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);
    fn is_selected(&self) -> bool;
    fn set_selected(&mut self, selected: bool);
}

/// Who created an entity and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    created_by: SmolStr,
    created: DateTime<Utc>,
}

impl Provenance {
    pub fn new(created_by: impl AsRef<str>, created: DateTime<Utc>) -> Self {
        Self { created_by: SmolStr::new(created_by), created }
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// A text passage linked to a concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appellation {
    id: AppellationId,
    position: CharSpan,
    string_rep: String,
    interpretation: ConceptRef,
    visible: bool,
    selected: bool,
    provenance: Provenance,
}

impl Appellation {
    pub fn new(
        id: AppellationId,
        position: CharSpan,
        string_rep: impl Into<String>,
        interpretation: ConceptRef,
        provenance: Provenance,
    ) -> Self {
        Self {
            id,
            position,
            string_rep: string_rep.into(),
            interpretation,
            visible: true,
            selected: false,
            provenance,
        }
    }

    pub fn position(&self) -> CharSpan {
        self.position
    }

    pub fn string_rep(&self) -> &str {
        &self.string_rep
    }

    pub fn interpretation(&self) -> &ConceptRef {
        &self.interpretation
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

impl Entity for Appellation {
    type Id = AppellationId;

    fn id(&self) -> AppellationId {
        self.id
    }

    fn index_key(&self) -> Option<SmolStr> {
        Some(SmolStr::new(self.interpretation.uri()))
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

/// A text passage (or a free-standing value) that denotes a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAppellation {
    id: DateAppellationId,
    position: Option<CharSpan>,
    string_rep: String,
    date: DateRepresentation,
    visible: bool,
    selected: bool,
    provenance: Provenance,
}

impl DateAppellation {
    pub fn new(
        id: DateAppellationId,
        position: Option<CharSpan>,
        string_rep: impl Into<String>,
        date: DateRepresentation,
        provenance: Provenance,
    ) -> Self {
        Self {
            id,
            position,
            string_rep: string_rep.into(),
            date,
            visible: true,
            selected: false,
            provenance,
        }
    }

    pub fn position(&self) -> Option<CharSpan> {
        self.position
    }

    pub fn string_rep(&self) -> &str {
        &self.string_rep
    }

    pub fn date(&self) -> DateRepresentation {
        self.date
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

impl Entity for DateAppellation {
    type Id = DateAppellationId;

    fn id(&self) -> DateAppellationId {
        self.id
    }

    fn index_key(&self) -> Option<SmolStr> {
        Some(SmolStr::new(self.date.to_string()))
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
