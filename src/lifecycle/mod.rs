// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Authoritative in-memory annotations of the open document and their create/delete
//! lifecycle.
//!
//! Remote operations are split in two synchronous halves around the backend call:
//! `begin_*` validates, guards against duplicates and hands out a [`PendingRequest`] that
//! snapshots the payload; `finish_*` applies the backend's answer. A response whose request
//! is no longer current (cancelled, superseded) is discarded as [`Completion::Stale`].
//! [`driver`] glues the halves to a [`crate::backend::Backend`].
//!
//! The controller never publishes while it is borrowed. Events are queued and go out through
//! [`publish_events`] (shared controller) or [`AnnotationController::publish_pending`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::mem;

use thiserror::Error;

use crate::backend::{
    AppellationPayload, AppellationRecord, DateAppellationPayload, DateAppellationRecord,
    RecordError, RelationPayload, RelationRecord, RequestError,
};
use crate::bus::{Event, EventBus};
use crate::model::{
    Appellation, AppellationId, CharSpan, DateAppellation, DateAppellationId, Entity, Relation,
    RelationId, TextId,
};

pub mod collection;
mod draft;
pub mod driver;

pub use collection::EntitySet;
pub use draft::{AppellationDraft, DateAppellationDraft, RelationDraft, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Appellation,
    DateAppellation,
    Relation,
}

impl EntityKind {
    fn slot(self) -> usize {
        match self {
            Self::Appellation => 0,
            Self::DateAppellation => 1,
            Self::Relation => 2,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Appellation => "appellation",
            Self::DateAppellation => "date appellation",
            Self::Relation => "relation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Appellation(AppellationId),
    DateAppellation(DateAppellationId),
    Relation(RelationId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Appellation(_) => EntityKind::Appellation,
            Self::DateAppellation(_) => EntityKind::DateAppellation,
            Self::Relation(_) => EntityKind::Relation,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Appellation(id) => write!(f, "appellation {id}"),
            Self::DateAppellation(id) => write!(f, "date appellation {id}"),
            Self::Relation(id) => write!(f, "relation {id}"),
        }
    }
}

/// A request that has been let through and awaits the backend's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest<P> {
    id: RequestId,
    payload: P,
}

impl<P> PendingRequest<P> {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The payload as it was when the request was issued.
    pub fn payload(&self) -> &P {
        &self.payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a create request is already in flight")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    #[error("{0} is not loaded")]
    NotFound(EntityRef),
    #[error("{0} is already being deleted")]
    Busy(EntityRef),
}

/// What a `finish_*` call did with the backend's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<I> {
    Applied(I),
    /// The request failed; local state is unchanged apart from the error flag.
    Failed(RequestError),
    /// The answer belongs to a request that is no longer current and was ignored.
    Stale,
}

impl<I> Completion<I> {
    pub fn applied(self) -> Option<I> {
        match self {
            Self::Applied(value) => Some(value),
            _ => None,
        }
    }
}

/// Progress of the create operation of one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    current: Option<RequestId>,
    error: Option<RequestError>,
}

impl OperationState {
    pub fn is_submitting(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<RequestId> {
        self.current
    }

    pub fn error(&self) -> Option<&RequestError> {
        self.error.as_ref()
    }
}

#[derive(Debug)]
pub struct AnnotationController {
    text: TextId,
    bus: EventBus,
    appellations: EntitySet<Appellation>,
    date_appellations: EntitySet<DateAppellation>,
    relations: EntitySet<Relation>,
    creating: [OperationState; 3],
    deleting: HashMap<EntityRef, RequestId>,
    delete_errors: [Option<RequestError>; 3],
    next_request: u64,
    outbox: Vec<Event>,
}

impl AnnotationController {
    pub fn new(text: TextId, bus: EventBus) -> Self {
        Self {
            text,
            bus,
            appellations: EntitySet::new(),
            date_appellations: EntitySet::new(),
            relations: EntitySet::new(),
            creating: Default::default(),
            deleting: HashMap::new(),
            delete_errors: Default::default(),
            next_request: 1,
            outbox: Vec::new(),
        }
    }

    pub fn text(&self) -> TextId {
        self.text
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn appellations(&self) -> &EntitySet<Appellation> {
        &self.appellations
    }

    pub fn date_appellations(&self) -> &EntitySet<DateAppellation> {
        &self.date_appellations
    }

    pub fn relations(&self) -> &EntitySet<Relation> {
        &self.relations
    }

    pub fn operation(&self, kind: EntityKind) -> &OperationState {
        &self.creating[kind.slot()]
    }

    pub fn delete_error(&self, kind: EntityKind) -> Option<&RequestError> {
        self.delete_errors[kind.slot()].as_ref()
    }

    /// Events raised since the last flush, oldest first.
    pub fn pending_events(&self) -> &[Event] {
        &self.outbox
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        mem::take(&mut self.outbox)
    }

    /// Publishes the queued events of a controller that is not shared behind a `RefCell`.
    pub fn publish_pending(&mut self) -> usize {
        let events = self.take_events();
        let count = events.len();
        for event in events {
            self.bus.publish(event);
        }
        count
    }

    pub fn is_deleting(&self, target: EntityRef) -> bool {
        self.deleting.contains_key(&target)
    }

    pub fn contains(&self, target: EntityRef) -> bool {
        match target {
            EntityRef::Appellation(id) => self.appellations.contains(id),
            EntityRef::DateAppellation(id) => self.date_appellations.contains(id),
            EntityRef::Relation(id) => self.relations.contains(id),
        }
    }

    /// Whether any anchored appellation overlaps `span`.
    pub fn covers(&self, span: CharSpan) -> bool {
        self.appellations.iter().any(|a| a.position().overlaps(&span))
            || self
                .date_appellations
                .iter()
                .filter_map(DateAppellation::position)
                .any(|position| position.overlaps(&span))
    }

    fn mint_request(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        id
    }

    fn begin_create<P>(
        &mut self,
        kind: EntityKind,
        payload: impl FnOnce(TextId) -> Result<P, ValidationError>,
    ) -> Result<PendingRequest<P>, CreateError> {
        if let Some(current) = self.creating[kind.slot()].current {
            tracing::debug!(%kind, request = %current, "create already in flight");
            return Err(CreateError::Busy);
        }
        let payload = payload(self.text)?;
        let id = self.mint_request();
        let state = &mut self.creating[kind.slot()];
        state.current = Some(id);
        state.error = None;
        Ok(PendingRequest { id, payload })
    }

    /// Checks `request` against the current one and records a failure.
    fn settle_create<T, I>(
        &mut self,
        kind: EntityKind,
        request: RequestId,
        result: Result<T, RequestError>,
    ) -> Result<T, Completion<I>> {
        let state = &mut self.creating[kind.slot()];
        if state.current != Some(request) {
            tracing::debug!(%kind, %request, "discarding stale create response");
            return Err(Completion::Stale);
        }
        state.current = None;
        result.map_err(|error| {
            tracing::warn!(%kind, %request, %error, "create request failed");
            state.error = Some(error.clone());
            Completion::Failed(error)
        })
    }

    fn reject_record<I>(&mut self, kind: EntityKind, error: RecordError) -> Completion<I> {
        let error = RequestError::Decode(error);
        tracing::warn!(%kind, %error, "backend returned a malformed record");
        self.creating[kind.slot()].error = Some(error.clone());
        Completion::Failed(error)
    }

    pub fn begin_create_appellation(
        &mut self,
        draft: &AppellationDraft,
    ) -> Result<PendingRequest<AppellationPayload>, CreateError> {
        self.begin_create(EntityKind::Appellation, |text| draft.payload(text))
    }

    pub fn finish_create_appellation(
        &mut self,
        ticket: &PendingRequest<AppellationPayload>,
        result: Result<AppellationRecord, RequestError>,
    ) -> Completion<AppellationId> {
        let kind = EntityKind::Appellation;
        let record = match self.settle_create(kind, ticket.id, result) {
            Ok(record) => record,
            Err(completion) => return completion,
        };
        let mut appellation = match Appellation::try_from(record) {
            Ok(appellation) => appellation,
            Err(error) => return self.reject_record(kind, error),
        };
        appellation.set_visible(true);
        appellation.set_selected(false);
        let id = appellation.id();
        self.appellations.insert(appellation.clone());
        self.outbox.push(Event::NewAppellation(appellation));
        self.select_appellation(id);
        Completion::Applied(id)
    }

    pub fn begin_create_date_appellation(
        &mut self,
        draft: &DateAppellationDraft,
    ) -> Result<PendingRequest<DateAppellationPayload>, CreateError> {
        self.begin_create(EntityKind::DateAppellation, |text| draft.payload(text))
    }

    pub fn finish_create_date_appellation(
        &mut self,
        ticket: &PendingRequest<DateAppellationPayload>,
        result: Result<DateAppellationRecord, RequestError>,
    ) -> Completion<DateAppellationId> {
        let kind = EntityKind::DateAppellation;
        let record = match self.settle_create(kind, ticket.id, result) {
            Ok(record) => record,
            Err(completion) => return completion,
        };
        let mut date = match DateAppellation::try_from(record) {
            Ok(date) => date,
            Err(error) => return self.reject_record(kind, error),
        };
        date.set_visible(true);
        date.set_selected(false);
        let id = date.id();
        self.date_appellations.insert(date.clone());
        self.outbox.push(Event::NewDateAppellation(date));
        self.select_date_appellation(id);
        Completion::Applied(id)
    }

    pub fn begin_create_relation(
        &mut self,
        draft: &RelationDraft,
    ) -> Result<PendingRequest<RelationPayload>, CreateError> {
        self.begin_create(EntityKind::Relation, |text| draft.payload(text))
    }

    pub fn finish_create_relation(
        &mut self,
        ticket: &PendingRequest<RelationPayload>,
        result: Result<RelationRecord, RequestError>,
    ) -> Completion<RelationId> {
        let record = match self.settle_create(EntityKind::Relation, ticket.id, result) {
            Ok(record) => record,
            Err(completion) => return completion,
        };
        let mut relation = Relation::from(record);
        relation.set_visible(true);
        relation.set_selected(false);
        let id = relation.id();
        self.relations.insert(relation.clone());
        self.outbox.push(Event::NewRelation(relation));
        self.select_relation(id);
        Completion::Applied(id)
    }

    /// Abandons the in-flight create of `kind`; its answer will be stale.
    pub fn cancel_create(&mut self, kind: EntityKind) -> bool {
        let state = &mut self.creating[kind.slot()];
        let cancelled = state.current.take();
        if let Some(request) = cancelled {
            tracing::debug!(%kind, %request, "create cancelled");
        }
        cancelled.is_some()
    }

    pub fn select_appellation(&mut self, id: AppellationId) -> bool {
        if !self.appellations.select_only(id) {
            return false;
        }
        self.outbox.push(Event::SelectedAppellation(id));
        true
    }

    pub fn select_date_appellation(&mut self, id: DateAppellationId) -> bool {
        if !self.date_appellations.select_only(id) {
            return false;
        }
        self.outbox.push(Event::SelectedDateAppellation(id));
        true
    }

    pub fn select_relation(&mut self, id: RelationId) -> bool {
        if !self.relations.select_only(id) {
            return false;
        }
        self.outbox.push(Event::SelectedRelation(id));
        true
    }

    pub fn select(&mut self, target: EntityRef) -> bool {
        match target {
            EntityRef::Appellation(id) => self.select_appellation(id),
            EntityRef::DateAppellation(id) => self.select_date_appellation(id),
            EntityRef::Relation(id) => self.select_relation(id),
        }
    }

    pub fn deselect_all(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Appellation => self.appellations.deselect_all(),
            EntityKind::DateAppellation => self.date_appellations.deselect_all(),
            EntityKind::Relation => self.relations.deselect_all(),
        }
    }

    /// Flips visibility of `target` and returns the new state.
    pub fn toggle_visible(&mut self, target: EntityRef) -> Option<bool> {
        match target {
            EntityRef::Appellation(id) => self.appellations.toggle_visible(id),
            EntityRef::DateAppellation(id) => self.date_appellations.toggle_visible(id),
            EntityRef::Relation(id) => self.relations.toggle_visible(id),
        }
    }

    pub fn hide_all(&mut self, kind: EntityKind) {
        self.set_all_visible(kind, false);
    }

    pub fn show_all(&mut self, kind: EntityKind) {
        self.set_all_visible(kind, true);
    }

    fn set_all_visible(&mut self, kind: EntityKind, visible: bool) {
        match kind {
            EntityKind::Appellation => self.appellations.set_all_visible(visible),
            EntityKind::DateAppellation => self.date_appellations.set_all_visible(visible),
            EntityKind::Relation => self.relations.set_all_visible(visible),
        }
    }

    pub fn begin_delete(
        &mut self,
        target: EntityRef,
    ) -> Result<PendingRequest<EntityRef>, DeleteError> {
        if !self.contains(target) {
            return Err(DeleteError::NotFound(target));
        }
        if self.deleting.contains_key(&target) {
            tracing::debug!(%target, "delete already in flight");
            return Err(DeleteError::Busy(target));
        }
        let id = self.mint_request();
        self.deleting.insert(target, id);
        self.delete_errors[target.kind().slot()] = None;
        Ok(PendingRequest { id, payload: target })
    }

    pub fn begin_delete_appellation(
        &mut self,
        id: AppellationId,
    ) -> Result<PendingRequest<EntityRef>, DeleteError> {
        self.begin_delete(EntityRef::Appellation(id))
    }

    pub fn begin_delete_date_appellation(
        &mut self,
        id: DateAppellationId,
    ) -> Result<PendingRequest<EntityRef>, DeleteError> {
        self.begin_delete(EntityRef::DateAppellation(id))
    }

    pub fn begin_delete_relation(
        &mut self,
        id: RelationId,
    ) -> Result<PendingRequest<EntityRef>, DeleteError> {
        self.begin_delete(EntityRef::Relation(id))
    }

    /// Applies the answer to a delete: on success the entity leaves every index at once.
    pub fn finish_delete(
        &mut self,
        ticket: &PendingRequest<EntityRef>,
        result: Result<(), RequestError>,
    ) -> Completion<EntityRef> {
        let target = ticket.payload;
        if self.deleting.get(&target) != Some(&ticket.id) {
            tracing::debug!(%target, request = %ticket.id, "discarding stale delete response");
            return Completion::Stale;
        }
        self.deleting.remove(&target);
        if let Err(error) = result {
            tracing::warn!(%target, %error, "delete request failed");
            self.delete_errors[target.kind().slot()] = Some(error.clone());
            return Completion::Failed(error);
        }
        let event = match target {
            EntityRef::Appellation(id) => {
                self.appellations.remove(id);
                Event::DeleteAppellation(id)
            }
            EntityRef::DateAppellation(id) => {
                self.date_appellations.remove(id);
                Event::DeleteDateAppellation(id)
            }
            EntityRef::Relation(id) => {
                self.relations.remove(id);
                Event::DeleteRelation(id)
            }
        };
        self.outbox.push(event);
        Completion::Applied(target)
    }

    /// Replaces the appellations with `records`; nothing changes if any record is malformed.
    pub fn load_appellations(
        &mut self,
        records: Vec<AppellationRecord>,
    ) -> Result<usize, RecordError> {
        let loaded = convert_all(records)?;
        let count = loaded.len();
        self.appellations.replace_all(loaded);
        Ok(count)
    }

    pub fn load_date_appellations(
        &mut self,
        records: Vec<DateAppellationRecord>,
    ) -> Result<usize, RecordError> {
        let loaded = convert_all(records)?;
        let count = loaded.len();
        self.date_appellations.replace_all(loaded);
        Ok(count)
    }

    pub fn load_relations(&mut self, records: Vec<RelationRecord>) -> usize {
        let count = records.len();
        self.relations.replace_all(records.into_iter().map(Relation::from));
        count
    }

    /// Replaces all three collections at once, or none of them.
    pub fn load_document(
        &mut self,
        appellations: Vec<AppellationRecord>,
        dates: Vec<DateAppellationRecord>,
        relations: Vec<RelationRecord>,
    ) -> Result<(usize, usize, usize), RecordError> {
        let appellations: Vec<Appellation> = convert_all(appellations)?;
        let dates: Vec<DateAppellation> = convert_all(dates)?;
        let counts = (appellations.len(), dates.len(), relations.len());
        self.appellations.replace_all(appellations);
        self.date_appellations.replace_all(dates);
        self.load_relations(relations);
        Ok(counts)
    }
}

/// Publishes what `controller` has queued, with the borrow released during delivery.
///
/// Handlers may borrow the controller, even mutably; anything they queue is published too.
pub fn publish_events(controller: &RefCell<AnnotationController>) -> usize {
    let mut published = 0;
    loop {
        let (bus, events) = {
            let mut controller = controller.borrow_mut();
            (controller.bus.clone(), controller.take_events())
        };
        if events.is_empty() {
            return published;
        }
        published += events.len();
        for event in events {
            bus.publish(event);
        }
    }
}

fn convert_all<R, E>(records: Vec<R>) -> Result<Vec<E>, RecordError>
where
    E: TryFrom<R, Error = RecordError>,
{
    records.into_iter().map(E::try_from).collect()
}
