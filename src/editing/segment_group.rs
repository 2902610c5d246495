// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! A formation line together with the performers that ride on it.

use super::control_points::{ControlPointController, HandleRef};
use crate::canvas::{SceneHost, SceneKey, SceneObject};
use crate::distribute::{Distribution, distribute_along_path};
use crate::editing::{ClassTag, Identity, Selectable};
use crate::error::Result;
use crate::model::{EntityId, PerformerId};
use crate::path::{CommandKind, Path, PathMeasure};
use kurbo::{Point, Rect, Vec2};

/// Progress of a whole-path drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOffset {
    /// Top-left of the path bounds when the drag started
    pub initial_position: Point,
    /// How far the path has been dragged so far
    pub from_initial: Vec2,
}

impl MoveOffset {
    fn at_rest(path: &Path) -> Self {
        Self {
            initial_position: path.bounding_box().origin(),
            from_initial: Vec2::ZERO,
        }
    }
}

/// Performers bound to one path.
///
/// The group owns its path exclusively. Handles exist only while control
/// is enabled.
#[derive(Debug)]
pub struct SegmentGroup {
    id: EntityId,
    performers: Vec<PerformerId>,
    path: Path,
    controller: ControlPointController,
    offset: MoveOffset,
    control_enabled: bool,
}

impl SegmentGroup {
    pub fn new(performers: Vec<PerformerId>, path: Path) -> Self {
        let offset = MoveOffset::at_rest(&path);
        Self {
            id: EntityId::next(),
            performers,
            path,
            controller: ControlPointController::new(),
            offset,
            control_enabled: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Performers in distribution order
    pub fn performers(&self) -> &[PerformerId] {
        &self.performers
    }

    pub fn contains(&self, performer: PerformerId) -> bool {
        self.performers.contains(&performer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> MoveOffset {
        self.offset
    }

    pub fn controller(&self) -> &ControlPointController {
        &self.controller
    }

    pub fn control_enabled(&self) -> bool {
        self.control_enabled
    }

    /// Draw the path at its current displayed position
    pub fn draw(&self, host: &mut dyn SceneHost) {
        let shown = self
            .path
            .apply_offset(self.offset.from_initial.x, self.offset.from_initial.y);
        host.add_to_scene(SceneObject::Curve {
            id: self.id,
            path: shown.to_bezpath(),
            editable: self.control_enabled,
        });
    }

    /// Create handles for every coordinate pair; no-op when already enabled
    pub fn enable_control(&mut self, host: &mut dyn SceneHost) {
        if self.control_enabled {
            return;
        }
        self.controller
            .materialize(&self.path, self.offset.from_initial, host);
        self.control_enabled = true;
        self.draw(host);
    }

    /// Remove every handle; no-op when already disabled
    pub fn disable_control(&mut self, host: &mut dyn SceneHost) {
        if !self.control_enabled {
            return;
        }
        self.controller.destroy(host);
        self.control_enabled = false;
        self.draw(host);
    }

    /// Live handle drag; see [`ControlPointController::on_handle_drag`]
    pub fn drag_handle(
        &mut self,
        handle: HandleRef,
        new_pos: Point,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        self.controller.on_handle_drag(
            handle,
            new_pos,
            &mut self.path,
            self.offset.from_initial,
            host,
        )?;
        self.draw(host);
        Ok(())
    }

    /// Fold handle edits and any pending move into a fresh path. The caller
    /// redistributes afterwards.
    pub fn commit(&mut self, host: &mut dyn SceneHost) -> Result<()> {
        let rebuilt = self
            .controller
            .commit(&self.path, self.offset.from_initial, host)?;
        self.replace_path(rebuilt);
        self.draw(host);
        Ok(())
    }

    /// Live whole-path drag so that the path's bounds start at `position`
    pub fn move_path_to(&mut self, position: Point, host: &mut dyn SceneHost) {
        self.offset.from_initial = position - self.offset.initial_position;
        self.controller
            .on_parent_move(&self.path, self.offset.from_initial, host);
        self.draw(host);
    }

    /// Swap in a new path, e.g. after a segment's command kind changed.
    /// Handles are recreated when control is enabled.
    pub fn update_path(&mut self, path: Path, host: &mut dyn SceneHost) {
        self.replace_path(path);
        if self.control_enabled {
            self.controller.materialize(&self.path, Vec2::ZERO, host);
        }
        self.draw(host);
    }

    /// Change the kind of one drawing command in place
    pub fn update_segment(
        &mut self,
        index: usize,
        kind: CommandKind,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        let path = self.path.with_command_kind(index, kind)?;
        self.update_path(path, host);
        Ok(())
    }

    fn replace_path(&mut self, path: Path) {
        self.offset = MoveOffset::at_rest(&path);
        self.path = path;
    }

    /// Replace the performers riding on the path
    pub fn set_performers(&mut self, performers: Vec<PerformerId>) {
        self.performers = performers;
    }

    /// Where every performer belongs on the current path
    pub fn distribute<M>(&self, measure: &M) -> Result<Distribution>
    where
        M: PathMeasure + ?Sized,
    {
        distribute_along_path(&self.performers, &self.path, measure)
    }

    /// Remove the path and its handles from the scene
    pub fn destroy(&mut self, host: &mut dyn SceneHost) {
        self.controller.destroy(host);
        self.control_enabled = false;
        host.remove_from_scene(SceneKey::Entity(self.id));
    }
}

impl Selectable for SegmentGroup {
    fn identity(&self) -> Option<Identity> {
        let id = self.id.raw();
        Some(Identity::new(ClassTag::Curve, id, id))
    }

    fn bounds(&self) -> Rect {
        self.path.bounding_box() + self.offset.from_initial
    }
}
