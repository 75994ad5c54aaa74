// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The current selection per kind, plus the callbacks waiting for the next one.

use std::collections::HashSet;
use std::fmt;

use smol_str::SmolStr;

use crate::config::SelectionConfig;
use crate::model::{
    AppellationId, CharSpan, DateAppellationId, TextRange, TokenIndices, TokenizedText,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectionKind {
    Text,
    Region,
    Appellation,
    DateAppellation,
}

impl SelectionKind {
    pub const ALL: [SelectionKind; 4] = [
        SelectionKind::Text,
        SelectionKind::Region,
        SelectionKind::Appellation,
        SelectionKind::DateAppellation,
    ];

    fn slot(self) -> usize {
        match self {
            Self::Text => 0,
            Self::Region => 1,
            Self::Appellation => 2,
            Self::DateAppellation => 3,
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Region => "region",
            Self::Appellation => "appellation",
            Self::DateAppellation => "date appellation",
        };
        f.write_str(name)
    }
}

/// Opaque reference to an image region, owned by the image viewer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionRef(SmolStr);

impl RegionRef {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(SmolStr::new(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A passage of the document, with the words it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSelection {
    tokens: TokenIndices,
    range: TextRange,
}

impl TextSelection {
    /// Selection covering the words `first..=last`.
    pub fn words(document: &TokenizedText, first: usize, last: usize) -> Option<Self> {
        let (first, last) = (first.min(last), first.max(last));
        let tokens: TokenIndices = (first..=last).collect();
        let range = document.range_for_tokens(&tokens)?;
        Some(Self { tokens, range })
    }

    /// Selection of an arbitrary character range; the touched words are derived from it.
    pub fn from_range(document: &TokenizedText, range: TextRange) -> Self {
        let tokens = document.tokens_overlapping(range.span()).collect();
        Self { tokens, range }
    }

    pub fn tokens(&self) -> &[usize] {
        &self.tokens
    }

    pub fn range(&self) -> &TextRange {
        &self.range
    }

    pub fn span(&self) -> CharSpan {
        self.range.span()
    }

    fn bounds(&self) -> Option<(usize, usize)> {
        Some((*self.tokens.first()?, *self.tokens.last()?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Text(TextSelection),
    Region(RegionRef),
    Appellation(AppellationId),
    DateAppellation(DateAppellationId),
}

impl Selection {
    pub fn kind(&self) -> SelectionKind {
        match self {
            Self::Text(_) => SelectionKind::Text,
            Self::Region(_) => SelectionKind::Region,
            Self::Appellation(_) => SelectionKind::Appellation,
            Self::DateAppellation(_) => SelectionKind::DateAppellation,
        }
    }

    pub fn as_text(&self) -> Option<&TextSelection> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    fn markers(&self) -> Vec<Marker> {
        match self {
            Self::Text(text) => text.tokens.iter().copied().map(Marker::Token).collect(),
            Self::Region(region) => vec![Marker::Region(region.clone())],
            Self::Appellation(id) => vec![Marker::Appellation(*id)],
            Self::DateAppellation(id) => vec![Marker::DateAppellation(*id)],
        }
    }
}

/// Something that can carry the visual "selected" marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    Token(usize),
    Region(RegionRef),
    Appellation(AppellationId),
    DateAppellation(DateAppellationId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionFailure {
    /// The user picked something of another kind than the one expected.
    WrongKind { expected: SelectionKind, got: SelectionKind },
    /// The consumer gave up waiting.
    Cancelled,
}

/// Callbacks waiting for the next selection of one kind.
pub struct Expectation {
    on_success: Box<dyn FnMut(&Selection)>,
    on_failure: Option<Box<dyn FnMut(&SelectionFailure)>>,
    autorelease: bool,
}

impl Expectation {
    /// Fires on the next matching selection, then releases itself.
    pub fn once(on_success: impl FnMut(&Selection) + 'static) -> Self {
        Self { on_success: Box::new(on_success), on_failure: None, autorelease: true }
    }

    /// Fires on every matching selection until released.
    pub fn persistent(on_success: impl FnMut(&Selection) + 'static) -> Self {
        Self { on_success: Box::new(on_success), on_failure: None, autorelease: false }
    }

    pub fn or_else(mut self, on_failure: impl FnMut(&SelectionFailure) + 'static) -> Self {
        self.on_failure = Some(Box::new(on_failure));
        self
    }

    pub fn autorelease(&self) -> bool {
        self.autorelease
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("autorelease", &self.autorelease)
            .field("has_failure", &self.on_failure.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpectationHandle {
    kind: SelectionKind,
    id: u64,
}

impl ExpectationHandle {
    pub fn kind(&self) -> SelectionKind {
        self.kind
    }
}

#[derive(Debug)]
struct Registered {
    id: u64,
    expectation: Expectation,
}

/// Every registered expectation, grouped by kind in registration order.
#[derive(Debug, Default)]
pub struct Expectations {
    lists: [Vec<Registered>; 4],
}

impl Expectations {
    pub fn count(&self, kind: SelectionKind) -> usize {
        self.lists[kind.slot()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendOutcome {
    /// Nothing was selected yet; the target became the selection.
    Started,
    Extended,
    /// The run crossed an annotated word; only the target is selected.
    Collapsed,
}

#[derive(Debug, Default)]
pub struct SelectionRegistry {
    current: [Option<Selection>; 4],
    marked: HashSet<Marker>,
    expectations: Expectations,
    next_handle: u64,
    config: SelectionConfig,
}

impl SelectionRegistry {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn current(&self, kind: SelectionKind) -> Option<&Selection> {
        self.current[kind.slot()].as_ref()
    }

    pub fn text(&self) -> Option<&TextSelection> {
        self.current(SelectionKind::Text).and_then(Selection::as_text)
    }

    pub fn is_selected(&self, marker: &Marker) -> bool {
        self.marked.contains(marker)
    }

    /// Makes `selection` current for its kind and returns the one it replaced.
    pub fn select(&mut self, selection: Selection) -> Option<Selection> {
        let slot = selection.kind().slot();
        let previous = self.current[slot].take();
        if let Some(previous) = &previous {
            self.unmark(previous);
        }
        self.marked.extend(selection.markers());
        self.current[slot] = Some(selection);
        previous
    }

    pub fn clear(&mut self, kind: SelectionKind) -> Option<Selection> {
        let previous = self.current[kind.slot()].take();
        if let Some(previous) = &previous {
            self.unmark(previous);
        }
        previous
    }

    fn unmark(&mut self, selection: &Selection) {
        for marker in selection.markers() {
            self.marked.remove(&marker);
        }
    }

    /// Extends the word selection towards `target`.
    ///
    /// The run between the nearest boundary and `target` is added in document order. A target
    /// inside the current selection trims it to end there. When a newly covered word is
    /// committed to an appellation, the selection collapses to `target` alone.
    pub fn extend(
        &mut self,
        target: usize,
        document: &TokenizedText,
        is_committed: impl Fn(usize) -> bool,
    ) -> Option<ExtendOutcome> {
        let Some((first, last)) = self.text().and_then(TextSelection::bounds) else {
            let selection = TextSelection::words(document, target, target)?;
            self.select(Selection::Text(selection));
            return Some(ExtendOutcome::Started);
        };

        let (from, to, mut run) = if target < first {
            (target, last, target..first)
        } else if target > last {
            (first, target, last + 1..target + 1)
        } else {
            (first, target, target..target)
        };

        let crosses = !self.config.allow_extend_across_annotations && run.any(is_committed);
        let (selection, outcome) = if crosses {
            (TextSelection::words(document, target, target)?, ExtendOutcome::Collapsed)
        } else {
            (TextSelection::words(document, from, to)?, ExtendOutcome::Extended)
        };
        self.select(Selection::Text(selection));
        Some(outcome)
    }

    pub fn expect(&mut self, kind: SelectionKind, expectation: Expectation) -> ExpectationHandle {
        let id = self.next_handle;
        self.next_handle += 1;
        self.expectations.lists[kind.slot()].push(Registered { id, expectation });
        ExpectationHandle { kind, id }
    }

    pub fn release(&mut self, handle: ExpectationHandle) -> bool {
        let list = &mut self.expectations.lists[handle.kind.slot()];
        let before = list.len();
        list.retain(|reg| reg.id != handle.id);
        list.len() != before
    }

    pub fn has_expectations(&self, kind: SelectionKind) -> bool {
        self.expectations.count(kind) > 0
    }

    /// Records `selection` and notifies every expectation of its kind.
    ///
    /// Returns how many callbacks fired.
    pub fn succeed(&mut self, selection: Selection) -> usize {
        let kind = selection.kind();
        self.select(selection.clone());
        let list = &mut self.expectations.lists[kind.slot()];
        let fired = list.len();
        list.retain_mut(|reg| {
            (reg.expectation.on_success)(&selection);
            !reg.expectation.autorelease
        });
        fired
    }

    /// Notifies every expectation of `kind` of the failure, then empties that kind: the current
    /// selection and every expectation, persistent ones included, are dropped.
    pub fn fail(&mut self, kind: SelectionKind, failure: SelectionFailure) -> usize {
        let failed = std::mem::take(&mut self.expectations.lists[kind.slot()]);
        let fired = failed.len();
        for mut reg in failed {
            if let Some(on_failure) = reg.expectation.on_failure.as_mut() {
                on_failure(&failure);
            }
        }
        self.clear(kind);
        fired
    }

    pub fn take_expectations(&mut self) -> Expectations {
        std::mem::take(&mut self.expectations)
    }

    /// Replaces the registered expectations with `expectations`.
    pub fn restore_expectations(&mut self, expectations: Expectations) {
        self.expectations = expectations;
    }
}

#[cfg(test)]
mod tests;
