// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use smol_str::SmolStr;

use crate::model::Entity;

/// Entities of one kind, indexed three ways: display order, id and secondary key.
///
/// Every mutation goes through methods that keep the three indices in step; an entity is
/// either in all of them or in none.
#[derive(Debug, Clone)]
pub struct EntitySet<E: Entity> {
    order: Vec<E::Id>,
    by_id: HashMap<E::Id, E>,
    by_key: HashMap<SmolStr, Vec<E::Id>>,
}

impl<E: Entity> Default for EntitySet<E> {
    fn default() -> Self {
        Self { order: Vec::new(), by_id: HashMap::new(), by_key: HashMap::new() }
    }
}

impl<E: Entity> EntitySet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: E::Id) -> Option<&E> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: E::Id) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Entities in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn with_key<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a E> + 'a {
        self.by_key
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }

    pub fn selected(&self) -> impl Iterator<Item = &E> + '_ {
        self.iter().filter(|entity| entity.is_selected())
    }

    /// Adds `entity` at the end, replacing any entity with the same id.
    pub fn insert(&mut self, entity: E) -> Option<E> {
        let previous = self.remove(entity.id());
        let id = entity.id();
        if let Some(key) = entity.index_key() {
            self.by_key.entry(key).or_default().push(id);
        }
        self.order.push(id);
        self.by_id.insert(id, entity);
        previous
    }

    /// Removes `id` from every index.
    pub fn remove(&mut self, id: E::Id) -> Option<E> {
        let entity = self.by_id.remove(&id)?;
        self.order.retain(|other| *other != id);
        if let Some(key) = entity.index_key() {
            if let Some(ids) = self.by_key.get_mut(&key) {
                ids.retain(|other| *other != id);
                if ids.is_empty() {
                    self.by_key.remove(&key);
                }
            }
        }
        Some(entity)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.by_id.clear();
        self.by_key.clear();
    }

    /// Replaces the whole content, keeping the given order.
    pub fn replace_all(&mut self, entities: impl IntoIterator<Item = E>) {
        self.clear();
        for entity in entities {
            self.insert(entity);
        }
    }

    /// Selects `id` and deselects everything else. Returns `false` if `id` is unknown.
    pub fn select_only(&mut self, id: E::Id) -> bool {
        if !self.by_id.contains_key(&id) {
            return false;
        }
        for (other, entity) in self.by_id.iter_mut() {
            entity.set_selected(*other == id);
        }
        true
    }

    pub fn deselect_all(&mut self) {
        for entity in self.by_id.values_mut() {
            entity.set_selected(false);
        }
    }

    /// Flips visibility of `id`, returning the new state.
    pub fn toggle_visible(&mut self, id: E::Id) -> Option<bool> {
        let entity = self.by_id.get_mut(&id)?;
        let visible = !entity.is_visible();
        entity.set_visible(visible);
        Some(visible)
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for entity in self.by_id.values_mut() {
            entity.set_visible(visible);
        }
    }

    /// Whether the three indices agree with each other.
    pub fn is_consistent(&self) -> bool {
        if self.order.len() != self.by_id.len() {
            return false;
        }
        if !self.order.iter().all(|id| self.by_id.contains_key(id)) {
            return false;
        }
        let keyed = self.by_key.values().map(Vec::len).sum::<usize>();
        let expected = self.by_id.values().filter(|entity| entity.index_key().is_some()).count();
        keyed == expected
            && self.by_key.iter().all(|(key, ids)| {
                ids.iter().all(|id| {
                    self.by_id.get(id).and_then(Entity::index_key).as_ref() == Some(key)
                })
            })
    }
}
