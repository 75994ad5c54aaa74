// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runs controller operations against a backend.
//!
//! The controller is borrowed only on either side of the `.await`, never across it, so other
//! tasks (a second click, a resize) can use it while a request is in flight. Events raised by
//! an operation are published after its last borrow ends.

use std::cell::RefCell;

use crate::backend::{Backend, RequestError};
use crate::model::{AppellationId, DateAppellationId, RelationId, RelationTemplate};

use super::{
    publish_events, AnnotationController, AppellationDraft, Completion, CreateError,
    DateAppellationDraft, DeleteError, EntityRef, RelationDraft,
};

pub async fn create_appellation<B: Backend>(
    controller: &RefCell<AnnotationController>,
    backend: &B,
    draft: &AppellationDraft,
) -> Result<Completion<AppellationId>, CreateError> {
    let ticket = controller.borrow_mut().begin_create_appellation(draft)?;
    let result = backend.create_appellation(ticket.payload().clone()).await;
    let completion = controller.borrow_mut().finish_create_appellation(&ticket, result);
    publish_events(controller);
    Ok(completion)
}

pub async fn create_date_appellation<B: Backend>(
    controller: &RefCell<AnnotationController>,
    backend: &B,
    draft: &DateAppellationDraft,
) -> Result<Completion<DateAppellationId>, CreateError> {
    let ticket = controller.borrow_mut().begin_create_date_appellation(draft)?;
    let result = backend.create_date_appellation(ticket.payload().clone()).await;
    let completion = controller.borrow_mut().finish_create_date_appellation(&ticket, result);
    publish_events(controller);
    Ok(completion)
}

pub async fn create_relation<B: Backend>(
    controller: &RefCell<AnnotationController>,
    backend: &B,
    draft: &RelationDraft,
) -> Result<Completion<RelationId>, CreateError> {
    let ticket = controller.borrow_mut().begin_create_relation(draft)?;
    let result = backend.create_relation(ticket.payload().clone()).await;
    let completion = controller.borrow_mut().finish_create_relation(&ticket, result);
    publish_events(controller);
    Ok(completion)
}

async fn delete<B: Backend>(
    controller: &RefCell<AnnotationController>,
    backend: &B,
    target: EntityRef,
) -> Result<Completion<EntityRef>, DeleteError> {
    let ticket = controller.borrow_mut().begin_delete(target)?;
    let result = match target {
        EntityRef::Appellation(id) => backend.delete_appellation(id).await,
        EntityRef::DateAppellation(id) => backend.delete_date_appellation(id).await,
        EntityRef::Relation(id) => backend.delete_relation(id).await,
    };
    let completion = controller.borrow_mut().finish_delete(&ticket, result);
    publish_events(controller);
    Ok(completion)
}

pub async fn delete_appellation<B: Backend>(
    controller: &RefCell<AnnotationController>,
    backend: &B,
    id: AppellationId,
) -> Result<Completion<EntityRef>, DeleteError> {
    delete(controller, backend, EntityRef::Appellation(id)).await
}

pub async fn delete_date_appellation<B: Backend>(
    controller: &RefCell<AnnotationController>,
    backend: &B,
    id: DateAppellationId,
) -> Result<Completion<EntityRef>, DeleteError> {
    delete(controller, backend, EntityRef::DateAppellation(id)).await
}

pub async fn delete_relation<B: Backend>(
    controller: &RefCell<AnnotationController>,
    backend: &B,
    id: RelationId,
) -> Result<Completion<EntityRef>, DeleteError> {
    delete(controller, backend, EntityRef::Relation(id)).await
}

/// Fetches every annotation of the controller's text and replaces the local collections.
///
/// The three queries run concurrently; local state changes only if all of them succeed.
pub async fn load_document<B: Backend>(
    controller: &RefCell<AnnotationController>,
    backend: &B,
) -> Result<(), RequestError> {
    let text = controller.borrow().text();
    let (appellations, dates, relations) = tokio::join!(
        backend.query_appellations(text),
        backend.query_date_appellations(text),
        backend.query_relations(text),
    );
    let (appellations, dates, relations) = (appellations?, dates?, relations?);

    let (loaded, dated, related) =
        controller.borrow_mut().load_document(appellations, dates, relations)?;
    tracing::debug!(%text, loaded, dated, related, "document annotations loaded");
    Ok(())
}

pub async fn relation_templates<B: Backend>(
    backend: &B,
) -> Result<Vec<RelationTemplate>, RequestError> {
    let records = backend.relation_templates().await?;
    let templates = records
        .into_iter()
        .map(RelationTemplate::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(templates)
}
