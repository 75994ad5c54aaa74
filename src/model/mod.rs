// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A document is a tokenized text; appellations point passages of it at concepts or dates,
//! and relations link appellations according to a template.

pub mod appellation;
pub mod concept;
pub mod date;
pub mod document;
pub(crate) mod fixtures;
pub mod ids;
pub mod position;
pub mod relation;

pub use appellation::{Appellation, DateAppellation, Entity, Provenance};
pub use concept::{Concept, ConceptRef};
pub use date::{DatePrecision, DateRepresentation, ParseDateError};
pub use document::{Token, TokenizeOptions, TokenizedText};
pub use ids::{
    AppellationId, DateAppellationId, FieldId, Id, RelationId, TemplateId, TextId,
};
pub use position::{
    format_token_ids, parse_token_ids, CharSpan, ParsePositionError, ParseTokenIdsError,
    TextRange, TokenIndices,
};
pub use relation::{
    FieldData, FieldKind, ParseFieldKindError, Relation, RelationTemplate, TemplateField,
    TemporalBounds,
};
