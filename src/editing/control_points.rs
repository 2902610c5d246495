// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Interactive control handles for a formation line.
//!
//! Every coordinate pair of the path gets one handle. Handles live in an
//! arena owned by the controller and refer to their neighbours by arena
//! index; the `incoming`/`outgoing` links only drive the dashed guide lines
//! drawn between chained handles.
//!
//! Handle identity is positional. Whenever the path is rebuilt the arena is
//! thrown away and filled again, and the generation counter moves on, so a
//! `HandleRef` taken before the rebuild is reported as stale instead of
//! silently pointing at a different handle.

use crate::canvas::{SceneHost, SceneKey, SceneObject};
use crate::editing::{ClassTag, Identity, Selectable};
use crate::error::{FormationError, Result};
use crate::model::EntityId;
use crate::path::{CommandKind, Path};
use kurbo::{Point, Rect, Size, Vec2};

/// Screen size of a handle, for hit testing and selection bounds
const HANDLE_SIZE: f64 = 8.0;

/// A generation-checked reference to one handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleRef {
    pub generation: u64,
    pub index: usize,
}

/// One draggable coordinate pair
#[derive(Debug, Clone, PartialEq)]
pub struct ControlHandle {
    pub id: EntityId,
    /// Command the coordinate pair belongs to
    pub command_index: usize,
    /// Position of the pair within its command
    pub slot: usize,
    /// Render position
    pub position: Point,
    pub incoming: Option<usize>,
    pub outgoing: Option<usize>,
    /// Guide line to the outgoing handle
    guide: Option<EntityId>,
}

impl Selectable for ControlHandle {
    fn identity(&self) -> Option<Identity> {
        let id = self.id.raw();
        Some(Identity::new(ClassTag::CurvePoint, id, id))
    }

    fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, Size::new(HANDLE_SIZE, HANDLE_SIZE))
    }
}

/// Keeps handles and path data in step
#[derive(Debug, Default)]
pub struct ControlPointController {
    handles: Vec<ControlHandle>,
    generation: u64,
    dirty: bool,
}

impl ControlPointController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn handles(&self) -> &[ControlHandle] {
        &self.handles
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Whether a drag has changed the path since the last commit
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// References to every live handle, in path order
    pub fn refs(&self) -> impl Iterator<Item = HandleRef> + '_ {
        (0..self.handles.len()).map(|index| HandleRef {
            generation: self.generation,
            index,
        })
    }

    /// The handle for coordinate `slot` of command `command_index`
    pub fn find(&self, command_index: usize, slot: usize) -> Option<HandleRef> {
        self.handles
            .iter()
            .position(|h| h.command_index == command_index && h.slot == slot)
            .map(|index| HandleRef {
                generation: self.generation,
                index,
            })
    }

    pub fn handle(&self, handle: HandleRef) -> Result<&ControlHandle> {
        let index = self.check(handle)?;
        Ok(&self.handles[index])
    }

    fn check(&self, handle: HandleRef) -> Result<usize> {
        if handle.generation != self.generation || handle.index >= self.handles.len() {
            return Err(FormationError::StaleHandleReference {
                generation: handle.generation,
                index: handle.index,
                current: self.generation,
            });
        }
        Ok(handle.index)
    }

    /// Throw away any existing handles and create one per coordinate pair
    /// of `path`, displayed at `stored + offset`.
    pub fn materialize(&mut self, path: &Path, offset: Vec2, host: &mut dyn SceneHost) {
        self.destroy(host);
        self.generation += 1;

        for (command_index, command) in path.commands().iter().enumerate() {
            for (slot, point) in command.coordinates().enumerate() {
                let incoming = if command_index > 0 && command.kind() != CommandKind::Line {
                    self.handles.len().checked_sub(1)
                } else {
                    None
                };
                let index = self.handles.len();
                if let Some(previous) = incoming {
                    self.handles[previous].outgoing = Some(index);
                }
                self.handles.push(ControlHandle {
                    id: EntityId::next(),
                    command_index,
                    slot,
                    position: point + offset,
                    incoming,
                    outgoing: None,
                    guide: None,
                });
            }
        }

        for handle in &mut self.handles {
            if handle.outgoing.is_some() {
                handle.guide = Some(EntityId::next());
            }
        }
        for index in 0..self.handles.len() {
            host.add_to_scene(SceneObject::Handle {
                id: self.handles[index].id,
                position: self.handles[index].position,
            });
            self.draw_guide(index, host);
        }
        self.dirty = false;
        tracing::debug!(
            "Materialized {} handles (generation {})",
            self.handles.len(),
            self.generation
        );
    }

    /// Remove every handle and guide line from the scene
    pub fn destroy(&mut self, host: &mut dyn SceneHost) {
        for handle in self.handles.drain(..) {
            host.remove_from_scene(SceneKey::Entity(handle.id));
            if let Some(guide) = handle.guide {
                host.remove_from_scene(SceneKey::Entity(guide));
            }
        }
    }

    fn draw_guide(&self, index: usize, host: &mut dyn SceneHost) {
        let handle = &self.handles[index];
        if let (Some(guide), Some(outgoing)) = (handle.guide, handle.outgoing) {
            host.add_to_scene(SceneObject::Guide {
                id: guide,
                from: handle.position,
                to: self.handles[outgoing].position,
            });
        }
    }

    /// Redraw the handle at `index` and both guide lines touching it
    fn refresh(&self, index: usize, host: &mut dyn SceneHost) {
        let handle = &self.handles[index];
        host.add_to_scene(SceneObject::Handle {
            id: handle.id,
            position: handle.position,
        });
        if let Some(incoming) = handle.incoming {
            self.draw_guide(incoming, host);
        }
        self.draw_guide(index, host);
    }

    /// A handle was dragged to `new_pos`. The path slot is updated at once
    /// (minus the pending whole-path offset); performers are not moved
    /// until the drag is committed.
    pub fn on_handle_drag(
        &mut self,
        handle: HandleRef,
        new_pos: Point,
        path: &mut Path,
        from_initial: Vec2,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        let index = self.check(handle)?;
        let (command_index, slot) = {
            let h = &self.handles[index];
            (h.command_index, h.slot)
        };
        path.set_coordinate(command_index, slot, new_pos - from_initial)?;
        self.handles[index].position = new_pos;
        self.refresh(index, host);
        self.dirty = true;
        Ok(())
    }

    /// The path was dragged as a whole: show every handle at its stored
    /// coordinate plus `from_initial`. Stored coordinates are untouched.
    pub fn on_parent_move(&mut self, path: &Path, from_initial: Vec2, host: &mut dyn SceneHost) {
        for index in 0..self.handles.len() {
            let (command_index, slot) = {
                let h = &self.handles[index];
                (h.command_index, h.slot)
            };
            if let Some(stored) = path.coordinate(command_index, slot) {
                self.handles[index].position = stored + from_initial;
            }
        }
        for index in 0..self.handles.len() {
            self.refresh(index, host);
        }
    }

    /// Rebuild the path from the handle positions with the pending offset
    /// folded in, then recreate every handle for the new path.
    pub fn commit(
        &mut self,
        path: &Path,
        from_initial: Vec2,
        host: &mut dyn SceneHost,
    ) -> Result<Path> {
        let mut rebuilt = path.apply_offset(from_initial.x, from_initial.y);
        for handle in &self.handles {
            rebuilt.set_coordinate(handle.command_index, handle.slot, handle.position)?;
        }
        let had_handles = !self.handles.is_empty();
        self.destroy(host);
        if had_handles {
            self.materialize(&rebuilt, Vec2::ZERO, host);
        }
        self.dirty = false;
        Ok(rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::HeadlessHost;

    fn materialized(text: &str) -> (ControlPointController, Path, HeadlessHost) {
        let path = Path::parse(text).unwrap();
        let mut host = HeadlessHost::new();
        let mut controller = ControlPointController::new();
        controller.materialize(&path, Vec2::ZERO, &mut host);
        (controller, path, host)
    }

    #[test]
    fn one_handle_per_coordinate_pair() {
        let (controller, path, host) = materialized("M 0 0 Q 50 100 100 0 L 150 0 Z");
        assert_eq!(controller.handles().len(), path.handle_count());
        assert_eq!(controller.handles().len(), 4);
        // Q control links back to the Move, Q end to the control; the Line
        // end has no incoming link
        let handles = controller.handles();
        assert_eq!(handles[0].incoming, None);
        assert_eq!(handles[1].incoming, Some(0));
        assert_eq!(handles[2].incoming, Some(1));
        assert_eq!(handles[3].incoming, None);
        assert_eq!(handles[0].outgoing, Some(1));
        assert_eq!(handles[2].outgoing, None);
        // Four handles plus two guide lines
        assert_eq!(host.census(), (0, 4, 2, 0));
    }

    #[test]
    fn drag_then_commit_keeps_structure() {
        let (mut controller, mut path, mut host) = materialized("M 0 0 Q 50 100 100 0");
        let end = controller.find(1, 1).unwrap();
        assert_eq!(controller.handle(end).unwrap().position, Point::new(100.0, 0.0));

        controller
            .on_handle_drag(end, Point::new(120.0, 10.0), &mut path, Vec2::ZERO, &mut host)
            .unwrap();
        assert!(controller.is_dirty());
        assert_eq!(path.to_svg(), "M 0 0 Q 50 100 120 10");

        let committed = controller.commit(&path, Vec2::ZERO, &mut host).unwrap();
        assert_eq!(committed.len(), 2);
        assert!(matches!(
            committed.commands()[0],
            crate::path::PathCommand::Move(_)
        ));
        assert_eq!(
            committed
                .commands()
                .iter()
                .filter(|c| c.kind() == CommandKind::Move)
                .count(),
            1
        );
        assert_eq!(committed.to_svg(), "M 0 0 Q 50 100 120 10");
        assert!(!controller.is_dirty());
    }

    #[test]
    fn drag_refreshes_guide_lines() {
        let (mut controller, mut path, mut host) = materialized("M 0 0 Q 50 100 100 0");
        let control = controller.find(1, 0).unwrap();
        controller
            .on_handle_drag(control, Point::new(60.0, 80.0), &mut path, Vec2::ZERO, &mut host)
            .unwrap();
        let handles = controller.handles();
        let into = handles[0].guide.unwrap();
        let out_of = handles[1].guide.unwrap();
        assert_eq!(
            host.get(SceneKey::Entity(into)),
            Some(&SceneObject::Guide {
                id: into,
                from: Point::new(0.0, 0.0),
                to: Point::new(60.0, 80.0),
            })
        );
        assert_eq!(
            host.get(SceneKey::Entity(out_of)),
            Some(&SceneObject::Guide {
                id: out_of,
                from: Point::new(60.0, 80.0),
                to: Point::new(100.0, 0.0),
            })
        );
    }

    #[test]
    fn references_go_stale_after_commit() {
        let (mut controller, path, mut host) = materialized("M 0 0 L 100 0");
        let old = controller.find(1, 0).unwrap();
        let rebuilt = controller.commit(&path, Vec2::ZERO, &mut host).unwrap();
        let mut rebuilt = rebuilt;
        let err = controller
            .on_handle_drag(old, Point::ZERO, &mut rebuilt, Vec2::ZERO, &mut host)
            .unwrap_err();
        assert_eq!(
            err,
            FormationError::StaleHandleReference {
                generation: old.generation,
                index: old.index,
                current: old.generation + 1,
            }
        );
        assert!(controller.find(1, 0).is_some());
    }

    #[test]
    fn parent_move_shifts_display_only() {
        let (mut controller, path, mut host) = materialized("M 0 0 L 100 0");
        controller.on_parent_move(&path, Vec2::new(10.0, 5.0), &mut host);
        assert_eq!(controller.handles()[1].position, Point::new(110.0, 5.0));
        assert_eq!(path.to_svg(), "M 0 0 L 100 0");
    }

    #[test]
    fn drag_during_move_stores_unshifted_coordinate() {
        let (mut controller, mut path, mut host) = materialized("M 0 0 L 100 0");
        let offset = Vec2::new(10.0, 0.0);
        controller.on_parent_move(&path, offset, &mut host);
        let end = controller.find(1, 0).unwrap();
        controller
            .on_handle_drag(end, Point::new(130.0, 0.0), &mut path, offset, &mut host)
            .unwrap();
        assert_eq!(path.to_svg(), "M 0 0 L 120 0");

        let committed = controller.commit(&path, offset, &mut host).unwrap();
        assert_eq!(committed.to_svg(), "M 10 0 L 130 0");
    }

    #[test]
    fn destroy_clears_scene() {
        let (mut controller, _path, mut host) = materialized("M 0 0 Q 50 100 100 0");
        controller.destroy(&mut host);
        assert!(controller.is_empty());
        assert!(host.is_empty());
    }
}
