// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Exclusive listening for the next selection of a kind.
//!
//! Several input fields can be on screen at once (every field of a relation template wants
//! the next appellation pick). Only one of them listens per kind; the others stay blocked
//! until it lets go.

use std::collections::BTreeMap;

use crate::model::FieldId;
use crate::selection::{Expectations, SelectionKind, SelectionRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    Listening,
    /// Another field holds the kind; the request had no effect.
    Blocked { holder: FieldId },
}

impl ListenOutcome {
    pub fn is_listening(&self) -> bool {
        matches!(self, Self::Listening)
    }
}

#[derive(Debug)]
struct Deferred {
    listeners: BTreeMap<SelectionKind, FieldId>,
    expectations: Expectations,
}

#[derive(Debug, Default)]
pub struct ListenerArbiter {
    listeners: BTreeMap<SelectionKind, FieldId>,
    deferred: Vec<Deferred>,
}

impl ListenerArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_listening(&mut self, field: &FieldId, kind: SelectionKind) -> ListenOutcome {
        match self.listeners.get(&kind) {
            Some(holder) if holder == field => ListenOutcome::Listening,
            Some(holder) => {
                tracing::debug!(%field, %holder, %kind, "listen request blocked");
                ListenOutcome::Blocked { holder: holder.clone() }
            }
            None => {
                self.listeners.insert(kind, field.clone());
                ListenOutcome::Listening
            }
        }
    }

    /// Releases `kind` if `field` holds it.
    pub fn stop_listening(&mut self, field: &FieldId, kind: SelectionKind) -> bool {
        if self.listeners.get(&kind) != Some(field) {
            return false;
        }
        self.listeners.remove(&kind);
        true
    }

    pub fn listener(&self, kind: SelectionKind) -> Option<&FieldId> {
        self.listeners.get(&kind)
    }

    pub fn is_listening(&self, field: &FieldId, kind: SelectionKind) -> bool {
        self.listeners.get(&kind) == Some(field)
    }

    /// Whether `field` would be turned away if it asked for `kind` now.
    pub fn is_blocked(&self, field: &FieldId, kind: SelectionKind) -> bool {
        self.listeners.get(&kind).is_some_and(|holder| holder != field)
    }

    /// Evicts every listener and every registered expectation until [`Self::resume`].
    ///
    /// Defers nest; each one returns the new depth.
    pub fn defer(&mut self, registry: &mut SelectionRegistry) -> usize {
        self.deferred.push(Deferred {
            listeners: std::mem::take(&mut self.listeners),
            expectations: registry.take_expectations(),
        });
        tracing::debug!(depth = self.deferred.len(), "input deferred");
        self.deferred.len()
    }

    /// Restores what the innermost [`Self::defer`] evicted.
    ///
    /// Listeners and expectations registered while deferred are discarded. Returns `false`
    /// when nothing was deferred.
    pub fn resume(&mut self, registry: &mut SelectionRegistry) -> bool {
        let Some(saved) = self.deferred.pop() else {
            return false;
        };
        self.listeners = saved.listeners;
        registry.restore_expectations(saved.expectations);
        tracing::debug!(depth = self.deferred.len(), "input resumed");
        true
    }

    pub fn defer_depth(&self) -> usize {
        self.deferred.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rstest::rstest;

    use super::{ListenOutcome, ListenerArbiter};
    use crate::model::{AppellationId, FieldId};
    use crate::selection::{Expectation, Selection, SelectionKind, SelectionRegistry};

    fn field(name: &str) -> FieldId {
        FieldId::new(name)
    }

    #[test]
    fn second_field_is_blocked_until_first_stops() {
        let mut arbiter = ListenerArbiter::new();
        let (a, b) = (field("subject"), field("object"));

        assert_eq!(arbiter.start_listening(&a, SelectionKind::Appellation), ListenOutcome::Listening);
        assert_eq!(
            arbiter.start_listening(&b, SelectionKind::Appellation),
            ListenOutcome::Blocked { holder: a.clone() }
        );
        assert!(arbiter.is_blocked(&b, SelectionKind::Appellation));

        assert!(!arbiter.stop_listening(&b, SelectionKind::Appellation));
        assert!(arbiter.stop_listening(&a, SelectionKind::Appellation));

        assert!(arbiter.start_listening(&b, SelectionKind::Appellation).is_listening());
        assert_eq!(arbiter.listener(SelectionKind::Appellation), Some(&b));
    }

    #[rstest]
    #[case(SelectionKind::Text)]
    #[case(SelectionKind::DateAppellation)]
    fn kinds_are_arbitrated_independently(#[case] other: SelectionKind) {
        let mut arbiter = ListenerArbiter::new();
        arbiter.start_listening(&field("subject"), SelectionKind::Appellation);

        assert!(arbiter.start_listening(&field("when"), other).is_listening());
        assert!(!arbiter.is_blocked(&field("when"), other));
    }

    #[test]
    fn repeated_request_by_holder_is_idempotent() {
        let mut arbiter = ListenerArbiter::new();
        let a = field("subject");
        assert!(arbiter.start_listening(&a, SelectionKind::Appellation).is_listening());
        assert!(arbiter.start_listening(&a, SelectionKind::Appellation).is_listening());
        assert!(!arbiter.is_blocked(&a, SelectionKind::Appellation));
        assert!(arbiter.stop_listening(&a, SelectionKind::Appellation));
        assert!(arbiter.listener(SelectionKind::Appellation).is_none());
    }

    #[test]
    fn defer_and_resume_restore_listeners_and_expectations() {
        let mut arbiter = ListenerArbiter::new();
        let mut registry = SelectionRegistry::default();
        let hits = Rc::new(RefCell::new(0));
        let sink = hits.clone();
        registry.expect(
            SelectionKind::Appellation,
            Expectation::persistent(move |_| *sink.borrow_mut() += 1),
        );
        arbiter.start_listening(&field("subject"), SelectionKind::Appellation);

        assert_eq!(arbiter.defer(&mut registry), 1);
        assert!(arbiter.listener(SelectionKind::Appellation).is_none());
        assert!(!registry.has_expectations(SelectionKind::Appellation));

        arbiter.start_listening(&field("modal"), SelectionKind::Appellation);
        registry.expect(SelectionKind::Appellation, Expectation::persistent(|_| {}));
        assert_eq!(arbiter.defer(&mut registry), 2);
        assert!(arbiter.resume(&mut registry));
        assert_eq!(arbiter.listener(SelectionKind::Appellation), Some(&field("modal")));

        assert!(arbiter.resume(&mut registry));
        assert_eq!(arbiter.listener(SelectionKind::Appellation), Some(&field("subject")));
        registry.succeed(Selection::Appellation(AppellationId::new(1)));
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(registry.take_expectations().count(SelectionKind::Appellation), 1);
    }

    #[test]
    fn resume_without_defer_is_a_no_op() {
        let mut arbiter = ListenerArbiter::new();
        let mut registry = SelectionRegistry::default();
        arbiter.start_listening(&field("subject"), SelectionKind::Text);

        assert!(!arbiter.resume(&mut registry));
        assert_eq!(arbiter.listener(SelectionKind::Text), Some(&field("subject")));
        assert_eq!(arbiter.defer_depth(), 0);
    }
}
