// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One open document and everything the user is doing with it.
//!
//! Raw input (a dragged text range, a word click, a click on a highlighted appellation) enters
//! here. If a field is listening for that kind of selection the input is delivered to it;
//! otherwise it becomes the current selection and is announced on the bus.
//!
//! The session follows the controller on the bus. Selecting an appellation or date
//! appellation (by click or by creating it) drops the raw text selection, and deleting one
//! drops it from the selection registry and the highlights.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::mem;
use std::rc::Rc;

use crate::bus::{Channel, Event, EventBus, SubscriptionId};
use crate::config::GlossaConfig;
use crate::geometry::{HighlightKey, Highlights, LayoutProbe};
use crate::lifecycle::{
    publish_events, AnnotationController, AppellationDraft, DateAppellationDraft,
};
use crate::listen::{ListenOutcome, ListenerArbiter};
use crate::model::{
    AppellationId, CharSpan, DateAppellationId, Entity, FieldId, TextId, TokenizedText,
};
use crate::selection::{
    Expectation, ExpectationHandle, ExtendOutcome, RegionRef, Selection, SelectionFailure,
    SelectionKind, SelectionRegistry, TextSelection,
};

/// Where a piece of input ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Nothing to select (empty range, unknown id, offsets outside the text).
    Ignored,
    /// Handed to the field listening for this kind, which no longer listens.
    Delivered { field: FieldId, fired: usize },
    /// Became the current selection of its kind.
    Selected,
}

pub struct AnnotationSession {
    document: TokenizedText,
    config: GlossaConfig,
    bus: EventBus,
    registry: Rc<RefCell<SelectionRegistry>>,
    arbiter: ListenerArbiter,
    controller: Rc<RefCell<AnnotationController>>,
    highlights: Rc<RefCell<Highlights>>,
    probe: Box<dyn LayoutProbe>,
    listening: BTreeMap<SelectionKind, ExpectationHandle>,
    deferred_listening: Vec<BTreeMap<SelectionKind, ExpectationHandle>>,
    subscriptions: Vec<SubscriptionId>,
}

impl AnnotationSession {
    pub fn new(document: TokenizedText, config: GlossaConfig, probe: Box<dyn LayoutProbe>) -> Self {
        let bus = EventBus::new();
        let controller = AnnotationController::new(document.text_id(), bus.clone());
        let registry = Rc::new(RefCell::new(SelectionRegistry::new(config.selection)));
        let highlights = Rc::new(RefCell::new(Highlights::new()));
        let subscriptions = [
            Channel::SelectedAppellation,
            Channel::SelectedDateAppellation,
            Channel::DeleteAppellation,
            Channel::DeleteDateAppellation,
        ]
        .into_iter()
        .map(|channel| {
            let (registry, highlights) = (Rc::clone(&registry), Rc::clone(&highlights));
            let publisher = bus.clone();
            bus.subscribe(channel, move |event| {
                follow_controller(event, &registry, &highlights, &publisher);
            })
        })
        .collect();
        Self {
            document,
            registry,
            config,
            bus,
            arbiter: ListenerArbiter::new(),
            controller: Rc::new(RefCell::new(controller)),
            highlights,
            probe,
            listening: BTreeMap::new(),
            deferred_listening: Vec::new(),
            subscriptions,
        }
    }

    /// Tokenizes `text` with the configured options and opens it.
    pub fn open(
        text_id: TextId,
        text: impl Into<String>,
        config: GlossaConfig,
        probe: Box<dyn LayoutProbe>,
    ) -> Self {
        let document = TokenizedText::new(text_id, text, config.tokenizer.options());
        Self::new(document, config, probe)
    }

    pub fn document(&self) -> &TokenizedText {
        &self.document
    }

    pub fn config(&self) -> &GlossaConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn registry(&self) -> Ref<'_, SelectionRegistry> {
        self.registry.borrow()
    }

    pub fn arbiter(&self) -> &ListenerArbiter {
        &self.arbiter
    }

    /// The shared controller, for [`crate::lifecycle::driver`] calls.
    pub fn controller(&self) -> &Rc<RefCell<AnnotationController>> {
        &self.controller
    }

    pub fn highlights(&self) -> Ref<'_, Highlights> {
        self.highlights.borrow()
    }

    /// A new appellation draft over the current text selection.
    pub fn appellation_draft(&self) -> AppellationDraft {
        match self.registry.borrow().text() {
            Some(text) => AppellationDraft::new().with_range(text.range().clone()),
            None => AppellationDraft::new(),
        }
    }

    pub fn date_appellation_draft(&self) -> DateAppellationDraft {
        match self.registry.borrow().text() {
            Some(text) => DateAppellationDraft::new().with_range(text.range().clone()),
            None => DateAppellationDraft::new(),
        }
    }

    /// A range dragged out by the user.
    pub fn handle_text_selection(&mut self, span: CharSpan) -> InputOutcome {
        if span.is_empty() {
            tracing::trace!(offset = span.start(), "ignoring collapsed text selection");
            return InputOutcome::Ignored;
        }
        let Some(range) = self.document.range(span) else {
            tracing::debug!(start = span.start(), end = span.end(), "selection outside the text");
            return InputOutcome::Ignored;
        };
        let selection = Selection::Text(TextSelection::from_range(&self.document, range.clone()));
        let outcome = self.route(selection);
        if outcome == InputOutcome::Selected {
            self.bus.publish(Event::SelectedText(range));
        }
        self.refresh_highlights();
        outcome
    }

    /// A click on word `token`; with `extend` the word selection grows towards it.
    ///
    /// Word clicks only shape the text selection. They never complete a listening field's
    /// request, since another extension may follow.
    pub fn handle_word_click(&mut self, token: usize, extend: bool) -> Option<ExtendOutcome> {
        let outcome = if extend {
            let controller = self.controller.borrow();
            let document = &self.document;
            let is_committed = |index: usize| {
                document.token(index).is_some_and(|word| controller.covers(word.span()))
            };
            self.registry.borrow_mut().extend(token, document, is_committed)?
        } else {
            let selection = TextSelection::words(&self.document, token, token)?;
            self.registry.borrow_mut().select(Selection::Text(selection));
            ExtendOutcome::Started
        };
        let range = self.registry.borrow().text().map(|text| text.range().clone());
        if let Some(range) = range {
            self.bus.publish(Event::SelectedText(range));
        }
        self.refresh_highlights();
        Some(outcome)
    }

    pub fn handle_region_selection(&mut self, region: RegionRef) -> InputOutcome {
        self.route(Selection::Region(region))
    }

    pub fn handle_appellation_click(&mut self, id: AppellationId) -> InputOutcome {
        if !self.controller.borrow().appellations().contains(id) {
            return InputOutcome::Ignored;
        }
        self.reject_listener(SelectionKind::DateAppellation, SelectionKind::Appellation);
        let outcome = self.route(Selection::Appellation(id));
        if outcome == InputOutcome::Selected {
            self.controller.borrow_mut().select_appellation(id);
            publish_events(&self.controller);
        }
        self.refresh_highlights();
        outcome
    }

    pub fn handle_date_appellation_click(&mut self, id: DateAppellationId) -> InputOutcome {
        if !self.controller.borrow().date_appellations().contains(id) {
            return InputOutcome::Ignored;
        }
        self.reject_listener(SelectionKind::Appellation, SelectionKind::DateAppellation);
        let outcome = self.route(Selection::DateAppellation(id));
        if outcome == InputOutcome::Selected {
            self.controller.borrow_mut().select_date_appellation(id);
            publish_events(&self.controller);
        }
        self.refresh_highlights();
        outcome
    }

    pub fn clear_text_selection(&mut self) {
        clear_text(&self.registry, &self.highlights, &self.bus);
    }

    /// Hands the next selection of `kind` to `field`, if no other field holds it.
    pub fn listen(
        &mut self,
        field: &FieldId,
        kind: SelectionKind,
        expectation: Expectation,
    ) -> ListenOutcome {
        let outcome = self.arbiter.start_listening(field, kind);
        if outcome.is_listening() {
            let mut registry = self.registry.borrow_mut();
            let handle = registry.expect(kind, expectation);
            if let Some(previous) = self.listening.insert(kind, handle) {
                registry.release(previous);
            }
        }
        outcome
    }

    pub fn stop_listening(&mut self, field: &FieldId, kind: SelectionKind) -> bool {
        if !self.arbiter.stop_listening(field, kind) {
            return false;
        }
        if let Some(handle) = self.listening.remove(&kind) {
            self.registry.borrow_mut().release(handle);
        }
        true
    }

    /// Gives up waiting: every expectation of `kind` hears [`SelectionFailure::Cancelled`].
    pub fn cancel_listening(&mut self, field: &FieldId, kind: SelectionKind) -> bool {
        if !self.arbiter.is_listening(field, kind) {
            return false;
        }
        self.registry.borrow_mut().fail(kind, SelectionFailure::Cancelled);
        self.stop_listening(field, kind)
    }

    /// Registers a consumer that is not a listening field.
    pub fn expect(&mut self, kind: SelectionKind, expectation: Expectation) -> ExpectationHandle {
        self.registry.borrow_mut().expect(kind, expectation)
    }

    pub fn release(&mut self, handle: ExpectationHandle) -> bool {
        self.registry.borrow_mut().release(handle)
    }

    /// Suspends all listening until [`Self::resume_input`], e.g. while a dialog is open.
    pub fn defer_input(&mut self) -> usize {
        self.deferred_listening.push(mem::take(&mut self.listening));
        self.arbiter.defer(&mut self.registry.borrow_mut())
    }

    pub fn resume_input(&mut self) -> bool {
        if !self.arbiter.resume(&mut self.registry.borrow_mut()) {
            return false;
        }
        self.listening = self.deferred_listening.pop().unwrap_or_default();
        true
    }

    /// Swaps in a new layout and recomputes every highlight against it.
    pub fn on_resize(&mut self, probe: Box<dyn LayoutProbe>) {
        self.probe = probe;
        self.highlights.borrow_mut().recompute(self.probe.as_ref(), &self.config.geometry);
    }

    /// Rebuilds highlights from the current selections and recomputes their geometry.
    ///
    /// Call after driver operations, which change selections behind the session's back.
    pub fn refresh_highlights(&mut self) {
        let mut highlights = self.highlights.borrow_mut();
        highlights.clear();
        if let Some(text) = self.registry.borrow().text() {
            highlights.track(HighlightKey::TextSelection, text.span());
        }
        let controller = self.controller.borrow();
        for appellation in controller.appellations().selected().filter(|a| a.is_visible()) {
            highlights.track(HighlightKey::Appellation(appellation.id()), appellation.position());
        }
        for date in controller.date_appellations().selected().filter(|d| d.is_visible()) {
            if let Some(position) = date.position() {
                highlights.track(HighlightKey::DateAppellation(date.id()), position);
            }
        }
        highlights.recompute(self.probe.as_ref(), &self.config.geometry);
    }

    fn route(&mut self, selection: Selection) -> InputOutcome {
        let kind = selection.kind();
        let listener = self.arbiter.listener(kind).cloned();
        let fired = self.registry.borrow_mut().succeed(selection);
        let Some(field) = listener else {
            return InputOutcome::Selected;
        };
        self.stop_listening(&field, kind);
        tracing::debug!(%field, %kind, fired, "selection delivered to listening field");
        InputOutcome::Delivered { field, fired }
    }

    /// A field waiting for `expected` gets `got` instead: it fails and stops listening.
    fn reject_listener(&mut self, expected: SelectionKind, got: SelectionKind) {
        let Some(field) = self.arbiter.listener(expected).cloned() else {
            return;
        };
        if self.arbiter.listener(got).is_some() {
            return;
        }
        let failure = SelectionFailure::WrongKind { expected, got };
        self.registry.borrow_mut().fail(expected, failure);
        self.stop_listening(&field, expected);
    }
}

impl Drop for AnnotationSession {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            self.bus.unsubscribe(subscription);
        }
    }
}

fn follow_controller(
    event: &Event,
    registry: &RefCell<SelectionRegistry>,
    highlights: &RefCell<Highlights>,
    bus: &EventBus,
) {
    match event {
        Event::SelectedAppellation(id) => {
            registry.borrow_mut().select(Selection::Appellation(*id));
            clear_text(registry, highlights, bus);
        }
        Event::SelectedDateAppellation(id) => {
            registry.borrow_mut().select(Selection::DateAppellation(*id));
            clear_text(registry, highlights, bus);
        }
        Event::DeleteAppellation(id) => {
            forget(registry, Selection::Appellation(*id));
            highlights.borrow_mut().untrack(HighlightKey::Appellation(*id));
        }
        Event::DeleteDateAppellation(id) => {
            forget(registry, Selection::DateAppellation(*id));
            highlights.borrow_mut().untrack(HighlightKey::DateAppellation(*id));
        }
        _ => {}
    }
}

fn clear_text(
    registry: &RefCell<SelectionRegistry>,
    highlights: &RefCell<Highlights>,
    bus: &EventBus,
) {
    registry.borrow_mut().clear(SelectionKind::Text);
    highlights.borrow_mut().untrack(HighlightKey::TextSelection);
    bus.publish(Event::ClearTextSelection);
}

/// Clears the slot of `selection`'s kind if it still holds `selection`.
fn forget(registry: &RefCell<SelectionRegistry>, selection: Selection) {
    let mut registry = registry.borrow_mut();
    let kind = selection.kind();
    if registry.current(kind) == Some(&selection) {
        registry.clear(kind);
        tracing::debug!(%kind, "deleted entity left the selection");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rstest::{fixture, rstest};

    use super::{AnnotationSession, InputOutcome};
    use crate::backend::{AppellationRecord, DateAppellationRecord, PositionRecord};
    use crate::bus::{Channel, Event, EventRecorder};
    use crate::config::GlossaConfig;
    use crate::geometry::{HighlightKey, MonospaceLayout};
    use crate::listen::ListenOutcome;
    use crate::model::fixtures::{provenance, sample_document, span, SAMPLE_TEXT};
    use crate::model::{AppellationId, ConceptRef, DateAppellationId, Entity, FieldId};
    use crate::lifecycle::publish_events;
    use crate::selection::{
        Expectation, ExtendOutcome, Marker, RegionRef, Selection, SelectionFailure,
        SelectionKind,
    };

    fn layout(columns: usize) -> Box<MonospaceLayout> {
        Box::new(MonospaceLayout::new(SAMPLE_TEXT.chars().count(), columns, 8.0, 20.0))
    }

    fn session_with(config: GlossaConfig) -> (AnnotationSession, EventRecorder) {
        let session = AnnotationSession::new(sample_document(), config, layout(80));
        let events = session.bus().recorder();
        (session, events)
    }

    #[fixture]
    fn session() -> (AnnotationSession, EventRecorder) {
        session_with(GlossaConfig::default())
    }

    fn load_democracy(session: &AnnotationSession) {
        let provenance = provenance();
        let appellation = AppellationRecord {
            id: AppellationId::new(7),
            position: PositionRecord::char_offsets(span(20, 29)),
            string_rep: "democracy".to_owned(),
            interpretation: ConceptRef::new("concept:42", "Democracy"),
            created_by: provenance.created_by().into(),
            created: provenance.created(),
        };
        let date = DateAppellationRecord {
            id: DateAppellationId::new(8),
            position: Some(PositionRecord::char_offsets(span(3, 7))),
            string_rep: "1848".to_owned(),
            date_representation: "1848".to_owned(),
            created_by: provenance.created_by().into(),
            created: provenance.created(),
        };
        session
            .controller()
            .borrow_mut()
            .load_document(vec![appellation], vec![date], Vec::new())
            .expect("load");
    }

    fn recording(seen: &Rc<RefCell<Vec<Selection>>>) -> Expectation {
        let seen = Rc::clone(seen);
        Expectation::once(move |selection| seen.borrow_mut().push(selection.clone()))
    }

    #[rstest]
    fn collapsed_selection_is_a_no_op(session: (AnnotationSession, EventRecorder)) {
        let (mut session, events) = session;
        assert_eq!(session.handle_text_selection(span(12, 12)), InputOutcome::Ignored);
        assert_eq!(session.handle_text_selection(span(60, 90)), InputOutcome::Ignored);
        assert!(session.registry().text().is_none());
        assert!(events.events().is_empty());
        assert!(session.highlights().is_empty());
    }

    #[rstest]
    fn text_selection_is_announced_and_highlighted(session: (AnnotationSession, EventRecorder)) {
        let (mut session, events) = session;
        assert_eq!(session.handle_text_selection(span(20, 29)), InputOutcome::Selected);

        let registry = session.registry();
        let text = registry.text().expect("text selection");
        assert_eq!(text.range().representation(), "democracy");
        assert_eq!(text.tokens(), &[5]);
        match events.events().as_slice() {
            [Event::SelectedText(range)] => assert_eq!(range.span(), span(20, 29)),
            other => panic!("unexpected events {other:?}"),
        }
        let highlights = session.highlights();
        let geometry = highlights.geometry(HighlightKey::TextSelection).expect("highlight");
        assert_eq!(geometry.len(), 1);
        assert_eq!(geometry.start().expect("start").width, 9.0 * 8.0);
    }

    #[rstest]
    fn listening_field_takes_the_next_text_selection(session: (AnnotationSession, EventRecorder)) {
        let (mut session, events) = session;
        let evidence = FieldId::new("evidence");
        let other = FieldId::new("context");
        let seen = Rc::new(RefCell::new(Vec::new()));

        assert!(session.listen(&evidence, SelectionKind::Text, recording(&seen)).is_listening());
        assert_eq!(
            session.listen(&other, SelectionKind::Text, recording(&seen)),
            ListenOutcome::Blocked { holder: evidence.clone() }
        );

        let outcome = session.handle_text_selection(span(42, 47));
        assert_eq!(outcome, InputOutcome::Delivered { field: evidence.clone(), fired: 1 });
        assert_eq!(seen.borrow().len(), 1);
        assert!(events.events().is_empty());
        assert!(session.arbiter().listener(SelectionKind::Text).is_none());

        assert!(session.listen(&other, SelectionKind::Text, recording(&seen)).is_listening());
    }

    #[rstest]
    fn appellation_click_selects_and_clears_text(session: (AnnotationSession, EventRecorder)) {
        let (mut session, events) = session;
        load_democracy(&session);
        session.handle_text_selection(span(42, 47));
        events.take();

        let outcome = session.handle_appellation_click(AppellationId::new(7));

        assert_eq!(outcome, InputOutcome::Selected);
        assert_eq!(
            events.channels(),
            vec![Channel::SelectedAppellation, Channel::ClearTextSelection]
        );
        assert!(session.registry().text().is_none());
        assert!(session.registry().is_selected(&Marker::Appellation(AppellationId::new(7))));
        let controller = session.controller().borrow();
        let appellation = controller.appellations().get(AppellationId::new(7)).expect("loaded");
        assert!(appellation.is_selected());
        assert!(session.highlights().is_tracked(HighlightKey::Appellation(AppellationId::new(7))));
        assert!(!session.highlights().is_tracked(HighlightKey::TextSelection));
    }

    #[rstest]
    fn unknown_appellation_click_is_ignored(session: (AnnotationSession, EventRecorder)) {
        let (mut session, events) = session;
        assert_eq!(session.handle_appellation_click(AppellationId::new(99)), InputOutcome::Ignored);
        assert!(events.events().is_empty());
    }

    #[rstest]
    fn appellation_click_completes_a_listening_field(session: (AnnotationSession, EventRecorder)) {
        let (mut session, events) = session;
        load_democracy(&session);
        let subject = FieldId::new("subject");
        let seen = Rc::new(RefCell::new(Vec::new()));
        session.listen(&subject, SelectionKind::Appellation, recording(&seen));

        let outcome = session.handle_appellation_click(AppellationId::new(7));

        assert_eq!(outcome, InputOutcome::Delivered { field: subject, fired: 1 });
        assert_eq!(*seen.borrow(), vec![Selection::Appellation(AppellationId::new(7))]);
        assert!(events.events().is_empty());
        assert_eq!(session.controller().borrow().appellations().selected().count(), 0);
    }

    #[rstest]
    fn picking_the_wrong_kind_fails_the_listener(session: (AnnotationSession, EventRecorder)) {
        let (mut session, _events) = session;
        load_democracy(&session);
        let when = FieldId::new("when");
        let failures = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&failures);
        let expectation = Expectation::once(|_| {})
            .or_else(move |failure| sink.borrow_mut().push(failure.clone()));
        session.listen(&when, SelectionKind::DateAppellation, expectation);

        assert_eq!(session.handle_appellation_click(AppellationId::new(7)), InputOutcome::Selected);

        assert_eq!(
            *failures.borrow(),
            vec![SelectionFailure::WrongKind {
                expected: SelectionKind::DateAppellation,
                got: SelectionKind::Appellation,
            }]
        );
        assert!(!session.arbiter().is_listening(&when, SelectionKind::DateAppellation));
        assert!(!session.registry().has_expectations(SelectionKind::DateAppellation));
    }

    #[rstest]
    fn date_appellation_click_is_highlighted(session: (AnnotationSession, EventRecorder)) {
        let (mut session, events) = session;
        load_democracy(&session);

        let outcome = session.handle_date_appellation_click(DateAppellationId::new(8));

        assert_eq!(outcome, InputOutcome::Selected);
        assert_eq!(
            events.channels(),
            vec![Channel::SelectedDateAppellation, Channel::ClearTextSelection]
        );
        let key = HighlightKey::DateAppellation(DateAppellationId::new(8));
        assert_eq!(session.highlights().geometry(key).map(|g| g.len()), Some(1));
    }

    #[rstest]
    fn extending_across_an_appellation_collapses(session: (AnnotationSession, EventRecorder)) {
        let (mut session, _events) = session;
        load_democracy(&session);

        assert_eq!(session.handle_word_click(3, false), Some(ExtendOutcome::Started));
        assert_eq!(session.handle_word_click(4, true), Some(ExtendOutcome::Extended));
        assert_eq!(session.registry().text().expect("text").range().representation(), "idea of");

        assert_eq!(session.handle_word_click(7, true), Some(ExtendOutcome::Collapsed));
        assert_eq!(session.registry().text().expect("text").tokens(), &[7]);
        assert_eq!(session.handle_word_click(99, true), None);
    }

    #[test]
    fn extension_may_cross_appellations_when_configured() {
        let mut config = GlossaConfig::default();
        config.selection.allow_extend_across_annotations = true;
        let (mut session, _events) = session_with(config);
        load_democracy(&session);

        session.handle_word_click(3, false);
        assert_eq!(session.handle_word_click(7, true), Some(ExtendOutcome::Extended));
        assert_eq!(session.registry().text().expect("text").tokens(), &[3, 4, 5, 6, 7]);
    }

    #[rstest]
    fn deferred_input_restores_the_listener(session: (AnnotationSession, EventRecorder)) {
        let (mut session, events) = session;
        let evidence = FieldId::new("evidence");
        let seen = Rc::new(RefCell::new(Vec::new()));
        session.listen(&evidence, SelectionKind::Text, recording(&seen));

        assert_eq!(session.defer_input(), 1);
        assert_eq!(session.handle_text_selection(span(0, 2)), InputOutcome::Selected);
        assert_eq!(events.channels(), vec![Channel::SelectedText]);
        assert!(seen.borrow().is_empty());

        assert!(session.resume_input());
        assert!(!session.resume_input());
        let outcome = session.handle_text_selection(span(51, 57));
        assert_eq!(outcome, InputOutcome::Delivered { field: evidence, fired: 1 });
        assert_eq!(seen.borrow().len(), 1);
    }

    #[rstest]
    fn cancelling_notifies_and_releases(session: (AnnotationSession, EventRecorder)) {
        let (mut session, _events) = session;
        let place = FieldId::new("place");
        let failures = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&failures);
        let expectation = Expectation::persistent(|_| {})
            .or_else(move |failure| sink.borrow_mut().push(failure.clone()));
        session.listen(&place, SelectionKind::Region, expectation);

        assert!(!session.cancel_listening(&FieldId::new("other"), SelectionKind::Region));
        assert!(session.cancel_listening(&place, SelectionKind::Region));

        assert_eq!(*failures.borrow(), vec![SelectionFailure::Cancelled]);
        assert!(!session.registry().has_expectations(SelectionKind::Region));
        assert_eq!(
            session.handle_region_selection(RegionRef::new("page-3")),
            InputOutcome::Selected
        );
    }

    #[rstest]
    fn resize_rewraps_highlights(session: (AnnotationSession, EventRecorder)) {
        let (mut session, _events) = session;
        session.handle_text_selection(span(12, 57));
        let key = HighlightKey::TextSelection;
        assert_eq!(session.highlights().geometry(key).map(|g| g.len()), Some(1));

        session.on_resize(layout(10));

        let highlights = session.highlights();
        let geometry = highlights.geometry(key).expect("highlight");
        assert_eq!(geometry.len(), 5);
        assert_eq!(geometry.mids().len(), 3);
    }

    #[rstest]
    fn drafts_pick_up_the_text_selection(session: (AnnotationSession, EventRecorder)) {
        let (mut session, _events) = session;
        assert!(session.appellation_draft().range().is_none());
        session.handle_text_selection(span(42, 47));
        let draft = session.appellation_draft();
        assert_eq!(draft.range().map(|r| r.representation()), Some("Paris"));
    }

    #[rstest]
    fn deleting_the_selected_appellation_drops_it_everywhere(
        session: (AnnotationSession, EventRecorder),
    ) {
        let (mut session, events) = session;
        load_democracy(&session);
        let id = AppellationId::new(7);
        session.handle_appellation_click(id);
        assert!(session.highlights().is_tracked(HighlightKey::Appellation(id)));
        events.take();

        let ticket = session.controller().borrow_mut().begin_delete_appellation(id).expect("begin");
        session.controller().borrow_mut().finish_delete(&ticket, Ok(()));
        assert_eq!(publish_events(session.controller()), 1);

        assert_eq!(events.channels(), vec![Channel::DeleteAppellation]);
        assert!(session.registry().current(SelectionKind::Appellation).is_none());
        assert!(!session.registry().is_selected(&Marker::Appellation(id)));
        assert!(!session.highlights().is_tracked(HighlightKey::Appellation(id)));
    }

    #[rstest]
    fn deleting_another_date_appellation_keeps_the_selection(
        session: (AnnotationSession, EventRecorder),
    ) {
        let (mut session, _events) = session;
        load_democracy(&session);
        let selected = DateAppellationId::new(8);
        session.handle_date_appellation_click(selected);

        session.bus().publish(Event::DeleteDateAppellation(DateAppellationId::new(30)));

        assert!(session.registry().is_selected(&Marker::DateAppellation(selected)));
        assert!(session.highlights().is_tracked(HighlightKey::DateAppellation(selected)));
    }

    #[test]
    fn dropped_sessions_stop_following_the_bus() {
        let (session, _events) = session_with(GlossaConfig::default());
        let bus = session.bus().clone();
        assert_eq!(bus.subscriber_count(Channel::SelectedAppellation), 2);

        drop(session);

        assert_eq!(bus.subscriber_count(Channel::SelectedAppellation), 1);
    }
}
