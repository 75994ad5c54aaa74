// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![cfg(test)]

use chrono::{TimeZone, Utc};

use super::appellation::{Appellation, DateAppellation, Provenance};
use super::concept::ConceptRef;
use super::date::DateRepresentation;
use super::document::{TokenizeOptions, TokenizedText};
use super::ids::{AppellationId, DateAppellationId, TemplateId, TextId};
use super::position::CharSpan;
use super::relation::{FieldKind, RelationTemplate, TemplateField};

pub(crate) const SAMPLE_TEXT: &str = "In 1848 the idea of democracy spread from Paris to Vienna and Berlin.";

pub(crate) fn provenance() -> Provenance {
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("timestamp");
    Provenance::new("erasmus", created)
}

pub(crate) fn sample_document() -> TokenizedText {
    TokenizedText::new(TextId::new(1), SAMPLE_TEXT, TokenizeOptions::default())
}

pub(crate) fn span(start: usize, end: usize) -> CharSpan {
    CharSpan::new(start, end).expect("span")
}

pub(crate) fn appellation(id: u64, start: usize, end: usize, uri: &str) -> Appellation {
    let doc = sample_document();
    let position = span(start, end);
    let string_rep = doc.slice(position).unwrap_or_default().to_owned();
    Appellation::new(
        AppellationId::new(id),
        position,
        string_rep,
        ConceptRef::new(uri, uri),
        provenance(),
    )
}

pub(crate) fn date_appellation(id: u64, year: i32) -> DateAppellation {
    DateAppellation::new(
        DateAppellationId::new(id),
        Some(span(3, 7)),
        year.to_string(),
        DateRepresentation::year(year),
        provenance(),
    )
}

/// `Concept` subject plus a `TextPosition` object, the smallest template with two kinds.
pub(crate) fn concept_and_text_template() -> RelationTemplate {
    RelationTemplate::new(
        TemplateId::new(10),
        "mentions",
        vec![
            TemplateField::new("subject", FieldKind::Concept),
            TemplateField::new("evidence", FieldKind::TextPosition),
        ],
    )
}

pub(crate) fn dated_template() -> RelationTemplate {
    RelationTemplate::new(
        TemplateId::new(11),
        "happened in",
        vec![
            TemplateField::new("event", FieldKind::Concept),
            TemplateField::new("place", FieldKind::Concept).with_concept_type("E53_Place"),
            TemplateField::new("when", FieldKind::Date),
        ],
    )
}
