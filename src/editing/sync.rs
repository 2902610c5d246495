// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Two-way selection sync between the canvas and the host application.
//!
//! Selecting on the canvas updates the application's selection, and a
//! selection made elsewhere in the application is mirrored on the canvas.
//! Each direction triggers the other, so every sync runs inside a
//! `Syncing` state and any notification that arrives while it is active is
//! dropped. The state is entered through a guard that restores `Idle` on
//! every exit path.

use super::selectable::{ClassTag, Identity, Selectable};
use super::selection::SelectionSet;
use crate::canvas::CanvasRef;
use crate::error::FormationError;
use std::cell::Cell;
use std::collections::BTreeSet;

/// The application's selection state
pub trait ExternalSelection {
    fn current(&self) -> SelectionSet;
    fn replace(&mut self, selection: SelectionSet);
}

/// The canvas side of selection sync
pub trait SelectionCanvas {
    /// Objects in the canvas's active selection
    fn active_objects(&self) -> Vec<&dyn Selectable>;

    /// The canvas object standing for external id `external_id` of `class_tag`
    fn resolve(&self, class_tag: ClassTag, external_id: u64) -> Option<CanvasRef>;

    fn identity_of(&self, target: CanvasRef) -> Option<Identity>;

    /// Make `targets` the active selection: one target directly, several as
    /// a group, none clears it
    fn set_active_objects(&mut self, targets: Vec<CanvasRef>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
}

struct SyncGuard<'a> {
    state: &'a Cell<SyncState>,
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.state.set(SyncState::Idle);
    }
}

/// Keeps canvas and application selection consistent
#[derive(Debug)]
pub struct SelectionSynchronizer {
    state: Cell<SyncState>,
}

impl Default for SelectionSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionSynchronizer {
    pub fn new() -> Self {
        Self {
            state: Cell::new(SyncState::Idle),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state.get()
    }

    fn enter(&self) -> Option<SyncGuard<'_>> {
        if self.state.get() == SyncState::Syncing {
            return None;
        }
        self.state.set(SyncState::Syncing);
        Some(SyncGuard { state: &self.state })
    }

    /// The canvas selection changed. Pushes the new selection to the
    /// application unless it already matches. Returns whether it pushed.
    pub fn canvas_changed_selection(
        &self,
        active: &[&dyn Selectable],
        external: &mut dyn ExternalSelection,
    ) -> bool {
        let Some(_guard) = self.enter() else {
            tracing::debug!("Ignoring canvas selection change during sync");
            return false;
        };

        let selection = SelectionSet::from_identities(identities(active.iter().copied()));
        if selection == external.current() {
            return false;
        }
        tracing::debug!("Pushing {} selected objects to the application", selection.len());
        external.replace(selection);
        true
    }

    /// The application's selection changed. Mirrors it on the canvas unless
    /// the canvas already shows exactly these objects. Returns whether the
    /// canvas selection was replaced.
    pub fn external_changed_selection(
        &self,
        selection: &SelectionSet,
        canvas: &mut dyn SelectionCanvas,
    ) -> bool {
        let Some(_guard) = self.enter() else {
            tracing::debug!("Ignoring application selection change during sync");
            return false;
        };

        let mut targets = Vec::new();
        for (class_tag, id) in selection.iter() {
            match canvas.resolve(class_tag, id) {
                Some(target) => targets.push(target),
                None => tracing::warn!("Selected {class_tag} {id} is not on the canvas"),
            }
        }

        let wanted: BTreeSet<String> = targets
            .iter()
            .filter_map(|target| match canvas.identity_of(*target) {
                Some(identity) => Some(identity.class_id()),
                None => {
                    tracing::warn!("{}: {target:?}", FormationError::CapabilityMissing);
                    None
                }
            })
            .collect();
        let current: BTreeSet<String> = identities(canvas.active_objects())
            .map(|identity| identity.class_id())
            .collect();
        if wanted == current {
            return false;
        }

        canvas.set_active_objects(targets);
        true
    }
}

/// Identities of `objects`, logging and skipping any without one
fn identities<'a>(
    objects: impl IntoIterator<Item = &'a dyn Selectable>,
) -> impl Iterator<Item = Identity> {
    objects.into_iter().filter_map(|object| {
        let identity = object.identity();
        if identity.is_none() {
            tracing::warn!("{}", FormationError::CapabilityMissing);
        }
        identity
    })
}
