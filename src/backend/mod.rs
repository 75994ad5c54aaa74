// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The annotation backend as seen from the client: an async CRUD surface plus the wire
//! records it exchanges.
//!
//! Records mirror the JSON the backend speaks. Positions travel as `"start,end"` strings and
//! are parsed into [`CharSpan`]s whenever a record is turned into a model value.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::model::{
    Appellation, AppellationId, CharSpan, Concept, ConceptRef, DateAppellation,
    DateAppellationId, DateRepresentation, FieldKind, ParseDateError, ParseFieldKindError,
    ParsePositionError, Provenance, Relation, RelationId, RelationTemplate, TemplateField,
    TemplateId, TemporalBounds, TextId,
};

mod memory;

pub use memory::{MemoryBackend, Operation};

/// Position type code for character offsets.
pub const CHAR_OFFSETS: &str = "CO";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(#[from] RecordError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("unsupported position type '{0}'")]
    PositionType(SmolStr),
    #[error(transparent)]
    Position(#[from] ParsePositionError),
    #[error(transparent)]
    Date(#[from] ParseDateError),
    #[error(transparent)]
    FieldKind(#[from] ParseFieldKindError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub position_type: SmolStr,
    pub position_value: String,
}

impl PositionRecord {
    pub fn char_offsets(span: CharSpan) -> Self {
        Self { position_type: SmolStr::new(CHAR_OFFSETS), position_value: span.to_position_value() }
    }

    pub fn span(&self) -> Result<CharSpan, RecordError> {
        if self.position_type != CHAR_OFFSETS {
            return Err(RecordError::PositionType(self.position_type.clone()));
        }
        Ok(CharSpan::parse(&self.position_value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppellationRecord {
    pub id: AppellationId,
    pub position: PositionRecord,
    #[serde(rename = "stringRep")]
    pub string_rep: String,
    pub interpretation: ConceptRef,
    #[serde(rename = "createdBy")]
    pub created_by: SmolStr,
    pub created: DateTime<Utc>,
}

impl TryFrom<AppellationRecord> for Appellation {
    type Error = RecordError;

    fn try_from(record: AppellationRecord) -> Result<Self, Self::Error> {
        let position = record.position.span()?;
        Ok(Appellation::new(
            record.id,
            position,
            record.string_rep,
            record.interpretation,
            Provenance::new(record.created_by, record.created),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAppellationRecord {
    pub id: DateAppellationId,
    #[serde(default)]
    pub position: Option<PositionRecord>,
    #[serde(rename = "stringRep")]
    pub string_rep: String,
    #[serde(rename = "dateRepresentation")]
    pub date_representation: String,
    #[serde(rename = "createdBy")]
    pub created_by: SmolStr,
    pub created: DateTime<Utc>,
}

impl TryFrom<DateAppellationRecord> for DateAppellation {
    type Error = RecordError;

    fn try_from(record: DateAppellationRecord) -> Result<Self, Self::Error> {
        let position = record.position.as_ref().map(PositionRecord::span).transpose()?;
        let date = DateRepresentation::parse(&record.date_representation)?;
        Ok(DateAppellation::new(
            record.id,
            position,
            record.string_rep,
            date,
            Provenance::new(record.created_by, record.created),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub id: RelationId,
    pub template: TemplateId,
    #[serde(default)]
    pub appellations: Vec<AppellationId>,
    #[serde(default)]
    pub date_appellations: Vec<DateAppellationId>,
    pub representation: String,
    #[serde(default)]
    pub started: Option<DateAppellationId>,
    #[serde(default)]
    pub ended: Option<DateAppellationId>,
    #[serde(default)]
    pub occurred: Option<DateAppellationId>,
    #[serde(rename = "createdBy")]
    pub created_by: SmolStr,
    pub created: DateTime<Utc>,
}

impl From<RelationRecord> for Relation {
    fn from(record: RelationRecord) -> Self {
        let temporal = TemporalBounds {
            started: record.started,
            ended: record.ended,
            occurred: record.occurred,
        };
        Relation::new(
            record.id,
            record.template,
            record.appellations,
            record.date_appellations,
            record.representation,
            Provenance::new(record.created_by, record.created),
        )
        .with_temporal(temporal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFieldRecord {
    pub label: SmolStr,
    #[serde(rename = "type")]
    pub kind: SmolStr,
    #[serde(default)]
    pub concept_type: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationTemplateRecord {
    pub id: TemplateId,
    pub name: SmolStr,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<TemplateFieldRecord>,
}

impl TryFrom<RelationTemplateRecord> for RelationTemplate {
    type Error = RecordError;

    fn try_from(record: RelationTemplateRecord) -> Result<Self, Self::Error> {
        let fields = record
            .fields
            .into_iter()
            .map(|field| {
                let kind = field.kind.parse::<FieldKind>()?;
                let built = TemplateField::new(field.label, kind);
                Ok(match field.concept_type {
                    Some(concept_type) => built.with_concept_type(concept_type),
                    None => built,
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;
        let template = RelationTemplate::new(record.id, record.name, fields);
        Ok(match record.description {
            Some(description) => template.with_description(description),
            None => template,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppellationPayload {
    #[serde(rename = "occursIn")]
    pub text: TextId,
    pub position: PositionRecord,
    #[serde(rename = "stringRep")]
    pub string_rep: String,
    /// Concept URI.
    pub interpretation: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateAppellationPayload {
    #[serde(rename = "occursIn")]
    pub text: TextId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionRecord>,
    #[serde(rename = "stringRep")]
    pub string_rep: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
}

/// Data bound to one template field, as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum FieldPayload {
    #[serde(rename = "TP")]
    Concept { appellation: AppellationId },
    #[serde(rename = "CO")]
    TextPosition {
        position: PositionRecord,
        #[serde(rename = "stringRep")]
        string_rep: String,
    },
    #[serde(rename = "DT")]
    Date { appellation: DateAppellationId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    pub index: usize,
    #[serde(flatten)]
    pub data: FieldPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationPayload {
    #[serde(rename = "occursIn")]
    pub text: TextId,
    pub template: TemplateId,
    pub fields: Vec<FieldBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<DateAppellationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended: Option<DateAppellationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred: Option<DateAppellationId>,
}

/// Remote store of annotations, concepts and relation templates.
///
/// Every call resolves exactly once; there are no timeouts and no cancellation. Futures are
/// not required to be `Send`: the client runs on a single cooperative thread.
pub trait Backend {
    fn create_appellation(
        &self,
        payload: AppellationPayload,
    ) -> impl Future<Output = Result<AppellationRecord, RequestError>>;

    fn delete_appellation(
        &self,
        id: AppellationId,
    ) -> impl Future<Output = Result<(), RequestError>>;

    fn create_date_appellation(
        &self,
        payload: DateAppellationPayload,
    ) -> impl Future<Output = Result<DateAppellationRecord, RequestError>>;

    fn delete_date_appellation(
        &self,
        id: DateAppellationId,
    ) -> impl Future<Output = Result<(), RequestError>>;

    fn create_relation(
        &self,
        payload: RelationPayload,
    ) -> impl Future<Output = Result<RelationRecord, RequestError>>;

    fn delete_relation(&self, id: RelationId) -> impl Future<Output = Result<(), RequestError>>;

    fn query_appellations(
        &self,
        text: TextId,
    ) -> impl Future<Output = Result<Vec<AppellationRecord>, RequestError>>;

    fn query_date_appellations(
        &self,
        text: TextId,
    ) -> impl Future<Output = Result<Vec<DateAppellationRecord>, RequestError>>;

    fn query_relations(
        &self,
        text: TextId,
    ) -> impl Future<Output = Result<Vec<RelationRecord>, RequestError>>;

    fn search_concepts(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Concept>, RequestError>>;

    fn relation_templates(
        &self,
    ) -> impl Future<Output = Result<Vec<RelationTemplateRecord>, RequestError>>;
}
