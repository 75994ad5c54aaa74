// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;

use chrono::Utc;
use smol_str::SmolStr;

use super::{
    AppellationPayload, AppellationRecord, Backend, DateAppellationPayload, DateAppellationRecord,
    FieldPayload, RelationPayload, RelationRecord, RelationTemplateRecord, RequestError,
};
use crate::model::{
    AppellationId, Concept, ConceptRef, DateAppellationId, DateRepresentation, RelationId, TextId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    CreateAppellation,
    DeleteAppellation,
    CreateDateAppellation,
    DeleteDateAppellation,
    CreateRelation,
    DeleteRelation,
    QueryAppellations,
    QueryDateAppellations,
    QueryRelations,
    SearchConcepts,
    RelationTemplates,
}

#[derive(Debug)]
struct MemoryState {
    created_by: SmolStr,
    next_id: u64,
    appellations: Vec<(TextId, AppellationRecord)>,
    date_appellations: Vec<(TextId, DateAppellationRecord)>,
    relations: Vec<(TextId, RelationRecord)>,
    concepts: Vec<Concept>,
    templates: Vec<RelationTemplateRecord>,
    calls: BTreeMap<Operation, usize>,
    fail_next: Option<RequestError>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            created_by: SmolStr::new("local"),
            next_id: 1,
            appellations: Vec::new(),
            date_appellations: Vec::new(),
            relations: Vec::new(),
            concepts: Vec::new(),
            templates: Vec::new(),
            calls: BTreeMap::new(),
            fail_next: None,
        }
    }
}

impl MemoryState {
    fn mint(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn concept_ref(&self, uri: &str) -> ConceptRef {
        self.concepts
            .iter()
            .find(|concept| concept.uri == uri)
            .map(Concept::to_ref)
            .unwrap_or_else(|| ConceptRef::new(uri, uri))
    }
}

/// In-process backend for offline sessions and tests.
///
/// Ids are minted from one counter shared by every entity table. Every response is delivered
/// after yielding to the scheduler once, so concurrent callers observe each other's pending
/// requests the way they would against a remote server.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RefCell<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_created_by(self, user: impl AsRef<str>) -> Self {
        self.state.borrow_mut().created_by = SmolStr::new(user);
        self
    }

    pub fn with_concepts(self, concepts: impl IntoIterator<Item = Concept>) -> Self {
        self.state.borrow_mut().concepts.extend(concepts);
        self
    }

    pub fn with_templates(
        self,
        templates: impl IntoIterator<Item = RelationTemplateRecord>,
    ) -> Self {
        self.state.borrow_mut().templates.extend(templates);
        self
    }

    /// The next minted id; later ids count up from it.
    pub fn set_next_id(&self, id: u64) {
        self.state.borrow_mut().next_id = id;
    }

    /// Makes the next request, whatever it is, fail with `error`.
    pub fn fail_next(&self, error: RequestError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    pub fn calls(&self, operation: Operation) -> usize {
        self.state.borrow().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.borrow().calls.values().sum()
    }

    pub fn seed_appellation(&self, text: TextId, record: AppellationRecord) {
        self.state.borrow_mut().appellations.push((text, record));
    }

    pub fn seed_date_appellation(&self, text: TextId, record: DateAppellationRecord) {
        self.state.borrow_mut().date_appellations.push((text, record));
    }

    pub fn seed_relation(&self, text: TextId, record: RelationRecord) {
        self.state.borrow_mut().relations.push((text, record));
    }

    /// Counts the call and takes the pending failure, if any.
    fn issue(&self, operation: Operation) -> Option<RequestError> {
        let mut state = self.state.borrow_mut();
        *state.calls.entry(operation).or_default() += 1;
        state.fail_next.take()
    }

    fn respond<'a, T>(
        &'a self,
        operation: Operation,
        handle: impl FnOnce(&mut MemoryState) -> Result<T, RequestError> + 'a,
    ) -> impl Future<Output = Result<T, RequestError>> + 'a {
        let failure = self.issue(operation);
        async move {
            tokio::task::yield_now().await;
            if let Some(error) = failure {
                return Err(error);
            }
            let mut state = self.state.borrow_mut();
            handle(&mut *state)
        }
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> RequestError {
    RequestError::Rejected { status: 404, message: format!("{what} {id} does not exist") }
}

impl Backend for MemoryBackend {
    fn create_appellation(
        &self,
        payload: AppellationPayload,
    ) -> impl Future<Output = Result<AppellationRecord, RequestError>> {
        self.respond(Operation::CreateAppellation, move |state| {
            let record = AppellationRecord {
                id: AppellationId::new(state.mint()),
                position: payload.position,
                string_rep: payload.string_rep,
                interpretation: state.concept_ref(&payload.interpretation),
                created_by: state.created_by.clone(),
                created: Utc::now(),
            };
            state.appellations.push((payload.text, record.clone()));
            Ok(record)
        })
    }

    fn delete_appellation(
        &self,
        id: AppellationId,
    ) -> impl Future<Output = Result<(), RequestError>> {
        self.respond(Operation::DeleteAppellation, move |state| {
            let before = state.appellations.len();
            state.appellations.retain(|(_, record)| record.id != id);
            if state.appellations.len() == before {
                return Err(not_found("appellation", id));
            }
            Ok(())
        })
    }

    fn create_date_appellation(
        &self,
        payload: DateAppellationPayload,
    ) -> impl Future<Output = Result<DateAppellationRecord, RequestError>> {
        self.respond(Operation::CreateDateAppellation, move |state| {
            let date = match (payload.month, payload.day) {
                (Some(month), Some(day)) => DateRepresentation::day(payload.year, month, day),
                (Some(month), None) => DateRepresentation::month(payload.year, month),
                (None, None) => Ok(DateRepresentation::year(payload.year)),
                (None, Some(_)) => {
                    return Err(RequestError::Rejected {
                        status: 400,
                        message: "day given without month".to_owned(),
                    })
                }
            }
            .map_err(|err| RequestError::Rejected { status: 400, message: err.to_string() })?;
            let record = DateAppellationRecord {
                id: DateAppellationId::new(state.mint()),
                position: payload.position,
                string_rep: payload.string_rep,
                date_representation: date.to_string(),
                created_by: state.created_by.clone(),
                created: Utc::now(),
            };
            state.date_appellations.push((payload.text, record.clone()));
            Ok(record)
        })
    }

    fn delete_date_appellation(
        &self,
        id: DateAppellationId,
    ) -> impl Future<Output = Result<(), RequestError>> {
        self.respond(Operation::DeleteDateAppellation, move |state| {
            let before = state.date_appellations.len();
            state.date_appellations.retain(|(_, record)| record.id != id);
            if state.date_appellations.len() == before {
                return Err(not_found("date appellation", id));
            }
            Ok(())
        })
    }

    fn create_relation(
        &self,
        payload: RelationPayload,
    ) -> impl Future<Output = Result<RelationRecord, RequestError>> {
        self.respond(Operation::CreateRelation, move |state| {
            let name = state
                .templates
                .iter()
                .find(|template| template.id == payload.template)
                .map(|template| template.name.to_string())
                .unwrap_or_else(|| format!("template {}", payload.template));

            let mut appellations = Vec::new();
            let mut date_appellations = Vec::new();
            let mut parts = Vec::new();
            for binding in &payload.fields {
                match &binding.data {
                    FieldPayload::Concept { appellation } => {
                        appellations.push(*appellation);
                        parts.push(appellation.to_string());
                    }
                    FieldPayload::TextPosition { string_rep, .. } => {
                        // Bare text positions become appellations without interpretation.
                        appellations.push(AppellationId::new(state.mint()));
                        parts.push(format!("\"{string_rep}\""));
                    }
                    FieldPayload::Date { appellation } => {
                        date_appellations.push(*appellation);
                        parts.push(appellation.to_string());
                    }
                }
            }

            let record = RelationRecord {
                id: RelationId::new(state.mint()),
                template: payload.template,
                appellations,
                date_appellations,
                representation: format!("{name}({})", parts.join(", ")),
                started: payload.started,
                ended: payload.ended,
                occurred: payload.occurred,
                created_by: state.created_by.clone(),
                created: Utc::now(),
            };
            state.relations.push((payload.text, record.clone()));
            Ok(record)
        })
    }

    fn delete_relation(&self, id: RelationId) -> impl Future<Output = Result<(), RequestError>> {
        self.respond(Operation::DeleteRelation, move |state| {
            let before = state.relations.len();
            state.relations.retain(|(_, record)| record.id != id);
            if state.relations.len() == before {
                return Err(not_found("relation", id));
            }
            Ok(())
        })
    }

    fn query_appellations(
        &self,
        text: TextId,
    ) -> impl Future<Output = Result<Vec<AppellationRecord>, RequestError>> {
        self.respond(Operation::QueryAppellations, move |state| {
            Ok(state
                .appellations
                .iter()
                .filter(|(owner, _)| *owner == text)
                .map(|(_, record)| record.clone())
                .collect())
        })
    }

    fn query_date_appellations(
        &self,
        text: TextId,
    ) -> impl Future<Output = Result<Vec<DateAppellationRecord>, RequestError>> {
        self.respond(Operation::QueryDateAppellations, move |state| {
            Ok(state
                .date_appellations
                .iter()
                .filter(|(owner, _)| *owner == text)
                .map(|(_, record)| record.clone())
                .collect())
        })
    }

    fn query_relations(
        &self,
        text: TextId,
    ) -> impl Future<Output = Result<Vec<RelationRecord>, RequestError>> {
        self.respond(Operation::QueryRelations, move |state| {
            Ok(state
                .relations
                .iter()
                .filter(|(owner, _)| *owner == text)
                .map(|(_, record)| record.clone())
                .collect())
        })
    }

    fn search_concepts(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<Concept>, RequestError>> {
        let needle = query.trim().to_lowercase();
        self.respond(Operation::SearchConcepts, move |state| {
            Ok(state
                .concepts
                .iter()
                .filter(|concept| concept.label.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        })
    }

    fn relation_templates(
        &self,
    ) -> impl Future<Output = Result<Vec<RelationTemplateRecord>, RequestError>> {
        self.respond(Operation::RelationTemplates, |state| Ok(state.templates.clone()))
    }
}
