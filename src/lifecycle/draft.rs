// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! User input gathered before a create request, and its local validation.

use smol_str::SmolStr;
use thiserror::Error;

use crate::backend::{
    AppellationPayload, DateAppellationPayload, FieldBinding, FieldPayload, PositionRecord,
    RelationPayload,
};
use crate::model::{
    ConceptRef, DateRepresentation, FieldData, FieldKind, ParseDateError, RelationTemplate,
    TemporalBounds, TextId, TextRange,
};

/// Reasons a draft cannot be submitted. None of these reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("nothing is selected")]
    EmptySelection,
    #[error("no concept has been chosen")]
    ConceptNotSelected,
    #[error("relation fields {missing:?} have no data")]
    FieldsUnbound { missing: Vec<usize> },
    #[error("field {field} expects {expected} data, got {got}")]
    FieldKindMismatch { field: usize, expected: FieldKind, got: FieldKind },
    #[error("template has no field {0}")]
    UnknownField(usize),
    #[error("no year given")]
    MissingYear,
    #[error(transparent)]
    InvalidDate(#[from] ParseDateError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppellationDraft {
    range: Option<TextRange>,
    concept: Option<ConceptRef>,
}

impl AppellationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_concept(mut self, concept: ConceptRef) -> Self {
        self.concept = Some(concept);
        self
    }

    pub fn range(&self) -> Option<&TextRange> {
        self.range.as_ref()
    }

    pub fn concept(&self) -> Option<&ConceptRef> {
        self.concept.as_ref()
    }

    pub(crate) fn payload(&self, text: TextId) -> Result<AppellationPayload, ValidationError> {
        let range = self.range.as_ref().filter(|range| !range.is_empty());
        let range = range.ok_or(ValidationError::EmptySelection)?;
        let concept = self.concept.as_ref().ok_or(ValidationError::ConceptNotSelected)?;
        Ok(AppellationPayload {
            text,
            position: PositionRecord::char_offsets(range.span()),
            string_rep: range.representation().to_owned(),
            interpretation: SmolStr::new(concept.uri()),
        })
    }
}

/// A date typed in by the user, optionally anchored to a passage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateAppellationDraft {
    range: Option<TextRange>,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl DateAppellationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn date(&self) -> Result<DateRepresentation, ValidationError> {
        let year = self.year.ok_or(ValidationError::MissingYear)?;
        let date = match (self.month, self.day) {
            (None, None) => DateRepresentation::year(year),
            (Some(month), None) => DateRepresentation::month(year, month)?,
            (Some(month), Some(day)) => DateRepresentation::day(year, month, day)?,
            (None, Some(day)) => {
                return Err(ParseDateError::Malformed(format!("{year:04}-??-{day:02}")).into())
            }
        };
        Ok(date)
    }

    pub(crate) fn payload(&self, text: TextId) -> Result<DateAppellationPayload, ValidationError> {
        if self.range.as_ref().is_some_and(TextRange::is_empty) {
            return Err(ValidationError::EmptySelection);
        }
        let date = self.date()?;
        let string_rep = match &self.range {
            Some(range) => range.representation().to_owned(),
            None => date.to_string(),
        };
        Ok(DateAppellationPayload {
            text,
            position: self.range.as_ref().map(|range| PositionRecord::char_offsets(range.span())),
            string_rep,
            year: date.year_value(),
            month: date.month_value(),
            day: date.day_value(),
        })
    }
}

/// Field bindings for one relation, evaluated as they come in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDraft {
    template: RelationTemplate,
    bindings: Vec<Option<FieldData>>,
    bound: usize,
    temporal: TemporalBounds,
}

impl RelationDraft {
    pub fn new(template: RelationTemplate) -> Self {
        let bindings = vec![None; template.fields().len()];
        Self { template, bindings, bound: 0, temporal: TemporalBounds::default() }
    }

    pub fn template(&self) -> &RelationTemplate {
        &self.template
    }

    /// Binds `data` to field `field`, returning what was bound there before.
    pub fn bind(
        &mut self,
        field: usize,
        data: FieldData,
    ) -> Result<Option<FieldData>, ValidationError> {
        let expected = self
            .template
            .field(field)
            .map(|slot| slot.kind())
            .ok_or(ValidationError::UnknownField(field))?;
        if data.kind() != expected {
            return Err(ValidationError::FieldKindMismatch { field, expected, got: data.kind() });
        }
        let previous = self.bindings[field].replace(data);
        if previous.is_none() {
            self.bound += 1;
        }
        Ok(previous)
    }

    pub fn unbind(&mut self, field: usize) -> Option<FieldData> {
        let previous = self.bindings.get_mut(field)?.take();
        if previous.is_some() {
            self.bound -= 1;
        }
        previous
    }

    pub fn binding(&self, field: usize) -> Option<&FieldData> {
        self.bindings.get(field).and_then(Option::as_ref)
    }

    pub fn ready_to_create(&self) -> bool {
        self.bound == self.bindings.len()
    }

    pub fn missing(&self) -> Vec<usize> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, binding)| binding.is_none())
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn set_temporal(&mut self, temporal: TemporalBounds) {
        self.temporal = temporal;
    }

    pub fn temporal(&self) -> TemporalBounds {
        self.temporal
    }

    pub(crate) fn payload(&self, text: TextId) -> Result<RelationPayload, ValidationError> {
        if !self.ready_to_create() {
            return Err(ValidationError::FieldsUnbound { missing: self.missing() });
        }
        let fields = self
            .bindings
            .iter()
            .enumerate()
            .filter_map(|(index, binding)| binding.as_ref().map(|data| (index, data)))
            .map(|(index, data)| {
                let data = match data {
                    FieldData::Appellation(id) => FieldPayload::Concept { appellation: *id },
                    FieldData::TextPosition(range) => FieldPayload::TextPosition {
                        position: PositionRecord::char_offsets(range.span()),
                        string_rep: range.representation().to_owned(),
                    },
                    FieldData::Date(id) => FieldPayload::Date { appellation: *id },
                };
                FieldBinding { index, data }
            })
            .collect();
        Ok(RelationPayload {
            text,
            template: self.template.id(),
            fields,
            started: self.temporal.started,
            ended: self.temporal.ended,
            occurred: self.temporal.occurred,
        })
    }
}
