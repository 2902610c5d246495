// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Identifiers for canvas objects and for the performers they represent.
//!
//! `EntityId` is a monotonically increasing `u64` drawn from a global atomic
//! counter. Control handles, guide lines, path outlines and segment groups
//! get one when they are created; a handle rebuilt after a path commit gets
//! a fresh id, so nothing can confuse it with the handle it replaced.
//!
//! `PerformerId` is the id the external data layer uses for a performer.
//! The canvas never invents these, it only echoes them back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a canvas object (handle, guide, group)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(1);

impl EntityId {
    /// Create a new unique entity ID
    pub fn next() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::next()
    }
}

/// The data layer's id for one performer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PerformerId(pub u64);

impl PerformerId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PerformerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
