// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Immutable selection set shared with the host application.
//!
//! `SelectionSet` groups selected domain objects by class tag. It wraps an
//! `Arc<BTreeMap<..>>` so it can be cheaply cloned into and out of the
//! application's state; mutations are copy-on-write via `Arc::make_mut`.
//! The ordered collections give a deterministic iteration order, and a
//! class with no selected ids is never stored, so equal selections compare
//! equal.

use super::selectable::{ClassTag, Identity};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Selected external ids, grouped by class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    inner: Arc<BTreeMap<ClassTag, BTreeSet<u64>>>,
}

impl SelectionSet {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Group the external ids of `identities` by class
    pub fn from_identities(identities: impl IntoIterator<Item = Identity>) -> Self {
        identities
            .into_iter()
            .map(|identity| (identity.class_tag, identity.external_id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of selected ids across all classes
    pub fn len(&self) -> usize {
        self.inner.values().map(BTreeSet::len).sum()
    }

    pub fn contains(&self, class_tag: ClassTag, id: u64) -> bool {
        self.inner
            .get(&class_tag)
            .is_some_and(|ids| ids.contains(&id))
    }

    /// Selected ids of one class, in ascending order
    pub fn ids(&self, class_tag: ClassTag) -> impl Iterator<Item = u64> + '_ {
        self.inner.get(&class_tag).into_iter().flatten().copied()
    }

    /// Every selected `(class, id)` pair
    pub fn iter(&self) -> impl Iterator<Item = (ClassTag, u64)> + '_ {
        self.inner
            .iter()
            .flat_map(|(tag, ids)| ids.iter().map(move |id| (*tag, *id)))
    }

    pub fn insert(&mut self, class_tag: ClassTag, id: u64) {
        Arc::make_mut(&mut self.inner)
            .entry(class_tag)
            .or_default()
            .insert(id);
    }

    pub fn remove(&mut self, class_tag: ClassTag, id: u64) {
        if !self.contains(class_tag, id) {
            return;
        }
        let inner = Arc::make_mut(&mut self.inner);
        if let Some(ids) = inner.get_mut(&class_tag) {
            ids.remove(&id);
            if ids.is_empty() {
                inner.remove(&class_tag);
            }
        }
    }
}

impl FromIterator<(ClassTag, u64)> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = (ClassTag, u64)>>(iter: T) -> Self {
        let mut set = SelectionSet::new();
        for (tag, id) in iter {
            set.insert(tag, id);
        }
        set
    }
}
