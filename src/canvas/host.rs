// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! The rendering host: where canvas objects end up.
//!
//! The engine never draws anything itself. It describes what should be on
//! screen as `SceneObject`s and hands them to a `SceneHost`. Adding an
//! object whose key is already present replaces it, so "move this handle"
//! is just another `add_to_scene`.

use crate::model::{EntityId, PerformerId};
use kurbo::{BezPath, Point, Rect};
use std::collections::BTreeMap;

/// Identifies one object in the host's scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SceneKey {
    Performer(PerformerId),
    Entity(EntityId),
}

/// A drawable object handed to the host
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    /// A performer dot with its label, drawn inside `bounds`
    Performer {
        performer: PerformerId,
        label: String,
        dot_center: Point,
        bounds: Rect,
    },
    /// A draggable control handle
    Handle { id: EntityId, position: Point },
    /// A dashed guide line between two chained handles
    Guide { id: EntityId, from: Point, to: Point },
    /// A formation line; `editable` is false while control is disabled
    Curve {
        id: EntityId,
        path: BezPath,
        editable: bool,
    },
}

impl SceneObject {
    pub fn key(&self) -> SceneKey {
        match self {
            SceneObject::Performer { performer, .. } => SceneKey::Performer(*performer),
            SceneObject::Handle { id, .. }
            | SceneObject::Guide { id, .. }
            | SceneObject::Curve { id, .. } => SceneKey::Entity(*id),
        }
    }
}

/// The drawing surface the engine talks to
pub trait SceneHost {
    /// Add `object`, replacing any object with the same key
    fn add_to_scene(&mut self, object: SceneObject);

    /// Remove the object with `key`; unknown keys are ignored
    fn remove_from_scene(&mut self, key: SceneKey);

    /// Ask for a repaint at the next opportunity
    fn request_redraw(&mut self);

    /// Toggle caching of the static field layer. Hosts without a cache
    /// can ignore this.
    fn set_render_caching(&mut self, _enabled: bool) {}
}

/// A host that keeps the scene in memory and never draws.
///
/// Used by the command line front end and by tests.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    objects: BTreeMap<SceneKey, SceneObject>,
    redraws: usize,
    render_caching: bool,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: SceneKey) -> Option<&SceneObject> {
        self.objects.get(&key)
    }

    pub fn contains(&self, key: SceneKey) -> bool {
        self.objects.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Number of objects of each variant: (performers, handles, guides, curves)
    pub fn census(&self) -> (usize, usize, usize, usize) {
        self.objects
            .values()
            .fold((0, 0, 0, 0), |(p, h, g, c), object| match object {
                SceneObject::Performer { .. } => (p + 1, h, g, c),
                SceneObject::Handle { .. } => (p, h + 1, g, c),
                SceneObject::Guide { .. } => (p, h, g + 1, c),
                SceneObject::Curve { .. } => (p, h, g, c + 1),
            })
    }

    /// Number of redraws requested so far
    pub fn redraws(&self) -> usize {
        self.redraws
    }

    pub fn render_caching(&self) -> bool {
        self.render_caching
    }
}

impl SceneHost for HeadlessHost {
    fn add_to_scene(&mut self, object: SceneObject) {
        self.objects.insert(object.key(), object);
    }

    fn remove_from_scene(&mut self, key: SceneKey) {
        self.objects.remove(&key);
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn set_render_caching(&mut self, enabled: bool) {
        self.render_caching = enabled;
    }
}
