// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::rc::Rc;

use rstest::{fixture, rstest};

use super::{
    Expectation, ExtendOutcome, Marker, RegionRef, Selection, SelectionFailure, SelectionKind,
    SelectionRegistry, TextSelection,
};
use crate::config::SelectionConfig;
use crate::model::fixtures::sample_document;
use crate::model::{AppellationId, TokenizedText};

#[fixture]
fn document() -> TokenizedText {
    sample_document()
}

#[fixture]
fn registry() -> SelectionRegistry {
    SelectionRegistry::new(SelectionConfig::default())
}

fn words(document: &TokenizedText, first: usize, last: usize) -> Selection {
    Selection::Text(TextSelection::words(document, first, last).expect("words"))
}

fn selected_tokens(registry: &SelectionRegistry) -> Vec<usize> {
    registry.text().map(|text| text.tokens().to_vec()).unwrap_or_default()
}

#[rstest]
fn select_moves_markers_and_returns_previous(mut registry: SelectionRegistry) {
    let first = Selection::Appellation(AppellationId::new(1));
    let second = Selection::Appellation(AppellationId::new(2));

    assert_eq!(registry.select(first.clone()), None);
    assert!(registry.is_selected(&Marker::Appellation(AppellationId::new(1))));

    assert_eq!(registry.select(second), Some(first));
    assert!(!registry.is_selected(&Marker::Appellation(AppellationId::new(1))));
    assert!(registry.is_selected(&Marker::Appellation(AppellationId::new(2))));
}

#[rstest]
fn kinds_keep_independent_slots(mut registry: SelectionRegistry, document: TokenizedText) {
    registry.select(words(&document, 3, 5));
    registry.select(Selection::Region(RegionRef::new("folio-12r")));

    assert_eq!(selected_tokens(&registry), vec![3, 4, 5]);
    assert!(registry.is_selected(&Marker::Region(RegionRef::new("folio-12r"))));

    registry.clear(SelectionKind::Text);
    assert!(registry.text().is_none());
    assert!(!registry.is_selected(&Marker::Token(4)));
    assert!(registry.current(SelectionKind::Region).is_some());
}

#[rstest]
fn word_selection_carries_the_covered_text(document: TokenizedText) {
    let selection = TextSelection::words(&document, 5, 3).expect("words");
    assert_eq!(selection.tokens(), &[3, 4, 5]);
    assert_eq!(selection.range().representation(), "idea of democracy");
    assert_eq!((selection.span().start(), selection.span().end()), (12, 29));
}

#[rstest]
#[case(8, vec![3, 4, 5, 6, 7, 8])]
#[case(1, vec![1, 2, 3, 4, 5])]
#[case(4, vec![3, 4])]
fn extend_grows_towards_the_target(
    mut registry: SelectionRegistry,
    document: TokenizedText,
    #[case] target: usize,
    #[case] expected: Vec<usize>,
) {
    registry.select(words(&document, 3, 5));

    let outcome = registry.extend(target, &document, |_| false);

    assert_eq!(outcome, Some(ExtendOutcome::Extended));
    assert_eq!(selected_tokens(&registry), expected);
}

#[rstest]
fn extend_without_selection_starts_at_target(
    mut registry: SelectionRegistry,
    document: TokenizedText,
) {
    assert_eq!(registry.extend(6, &document, |_| false), Some(ExtendOutcome::Started));
    assert_eq!(selected_tokens(&registry), vec![6]);
}

#[rstest]
fn extend_across_annotated_word_collapses_to_target(
    mut registry: SelectionRegistry,
    document: TokenizedText,
) {
    registry.select(words(&document, 1, 2));

    let outcome = registry.extend(8, &document, |token| token == 5);

    assert_eq!(outcome, Some(ExtendOutcome::Collapsed));
    assert_eq!(selected_tokens(&registry), vec![8]);
    assert!(!registry.is_selected(&Marker::Token(1)));
    assert!(registry.is_selected(&Marker::Token(8)));
}

#[rstest]
fn extend_may_cross_annotations_when_configured(document: TokenizedText) {
    let mut registry =
        SelectionRegistry::new(SelectionConfig { allow_extend_across_annotations: true });
    registry.select(words(&document, 1, 2));

    let outcome = registry.extend(6, &document, |token| token == 5);

    assert_eq!(outcome, Some(ExtendOutcome::Extended));
    assert_eq!(selected_tokens(&registry), vec![1, 2, 3, 4, 5, 6]);
}

#[rstest]
fn extend_past_last_word_is_ignored(mut registry: SelectionRegistry, document: TokenizedText) {
    registry.select(words(&document, 3, 3));
    assert_eq!(registry.extend(99, &document, |_| false), None);
    assert_eq!(selected_tokens(&registry), vec![3]);
}

#[rstest]
fn success_fires_in_registration_order_and_drops_autorelease(mut registry: SelectionRegistry) {
    let log = Rc::new(RefCell::new(Vec::new()));
    for tag in ["once", "keep"] {
        let log = log.clone();
        let callback = move |selection: &Selection| log.borrow_mut().push((tag, selection.kind()));
        let expectation = if tag == "once" {
            Expectation::once(callback)
        } else {
            Expectation::persistent(callback)
        };
        registry.expect(SelectionKind::Appellation, expectation);
    }

    let fired = registry.succeed(Selection::Appellation(AppellationId::new(4)));
    assert_eq!(fired, 2);
    assert_eq!(
        *log.borrow(),
        vec![("once", SelectionKind::Appellation), ("keep", SelectionKind::Appellation)]
    );
    assert!(registry.is_selected(&Marker::Appellation(AppellationId::new(4))));

    log.borrow_mut().clear();
    assert_eq!(registry.succeed(Selection::Appellation(AppellationId::new(5))), 1);
    assert_eq!(*log.borrow(), vec![("keep", SelectionKind::Appellation)]);
}

#[rstest]
fn success_only_notifies_matching_kind(mut registry: SelectionRegistry) {
    let hits = Rc::new(RefCell::new(0));
    let sink = hits.clone();
    registry.expect(
        SelectionKind::DateAppellation,
        Expectation::persistent(move |_| *sink.borrow_mut() += 1),
    );

    assert_eq!(registry.succeed(Selection::Appellation(AppellationId::new(1))), 0);
    assert_eq!(*hits.borrow(), 0);
}

#[rstest]
fn failure_notifies_and_clears_slot(mut registry: SelectionRegistry) {
    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = failures.clone();
    registry.expect(
        SelectionKind::Appellation,
        Expectation::persistent(|_| {})
            .or_else(move |failure| sink.borrow_mut().push(failure.clone())),
    );
    registry.expect(SelectionKind::Appellation, Expectation::once(|_| {}));
    registry.select(Selection::Appellation(AppellationId::new(9)));

    let failure = SelectionFailure::WrongKind {
        expected: SelectionKind::Appellation,
        got: SelectionKind::Text,
    };
    assert_eq!(registry.fail(SelectionKind::Appellation, failure.clone()), 2);

    assert_eq!(*failures.borrow(), vec![failure]);
    assert!(registry.current(SelectionKind::Appellation).is_none());
    assert!(!registry.is_selected(&Marker::Appellation(AppellationId::new(9))));
    assert!(!registry.has_expectations(SelectionKind::Appellation));
    assert_eq!(registry.succeed(Selection::Appellation(AppellationId::new(9))), 0);
    assert_eq!(failures.borrow().len(), 1);
}

#[rstest]
fn released_expectations_no_longer_fire(mut registry: SelectionRegistry) {
    let hits = Rc::new(RefCell::new(0));
    let sink = hits.clone();
    let handle = registry.expect(
        SelectionKind::Appellation,
        Expectation::persistent(move |_| *sink.borrow_mut() += 1),
    );

    assert!(registry.release(handle));
    assert!(!registry.release(handle));
    registry.succeed(Selection::Appellation(AppellationId::new(1)));

    assert_eq!(*hits.borrow(), 0);
    assert!(!registry.has_expectations(SelectionKind::Appellation));
}

#[rstest]
fn taken_expectations_are_restored_wholesale(mut registry: SelectionRegistry) {
    let hits = Rc::new(RefCell::new(0));
    let sink = hits.clone();
    registry.expect(
        SelectionKind::Appellation,
        Expectation::persistent(move |_| *sink.borrow_mut() += 1),
    );

    let saved = registry.take_expectations();
    assert_eq!(saved.count(SelectionKind::Appellation), 1);
    registry.succeed(Selection::Appellation(AppellationId::new(1)));
    assert_eq!(*hits.borrow(), 0);

    registry.restore_expectations(saved);
    registry.succeed(Selection::Appellation(AppellationId::new(2)));
    assert_eq!(*hits.borrow(), 1);
}
