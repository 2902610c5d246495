// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! The in-memory canvas: performer graphics, segment groups and the active
//! selection.
//!
//! Performer positions are render coordinates. While several objects are
//! selected together their positions are stored relative to the center of
//! the selection, the way a selection group on a drawing canvas works;
//! `select` rebases them when a group forms or dissolves. Everything handed
//! to the host is absolute.

use super::host::SceneHost;
use super::performer::PerformerDot;
use crate::editing::{ClassTag, Identity, SegmentGroup, Selectable, SelectionCanvas};
use crate::error::{FormationError, Result};
use crate::model::{EntityId, FormationPage, FormationPoint, PerformerId};
use crate::settings::FieldSettings;
use crate::transform::CoordinateTransform;
use kurbo::{Point, Rect, Vec2};
use std::collections::BTreeMap;

/// A selectable object on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanvasRef {
    Performer(PerformerId),
    Handle(EntityId),
    Curve(EntityId),
}

/// What is currently selected on the canvas
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ActiveSelection {
    #[default]
    None,
    Single(CanvasRef),
    /// Several objects moved together around `center`
    Group { members: Vec<CanvasRef>, center: Point },
}

impl ActiveSelection {
    pub fn members(&self) -> &[CanvasRef] {
        match self {
            ActiveSelection::None => &[],
            ActiveSelection::Single(target) => std::slice::from_ref(target),
            ActiveSelection::Group { members, .. } => members,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ActiveSelection::None)
    }

    pub fn contains(&self, target: CanvasRef) -> bool {
        self.members().contains(&target)
    }

    /// Offset of a performer's position due to group selection
    pub fn group_offset(&self, performer: PerformerId) -> Vec2 {
        match self {
            ActiveSelection::Group { members, center }
                if members.contains(&CanvasRef::Performer(performer)) =>
            {
                center.to_vec2()
            }
            _ => Vec2::ZERO,
        }
    }
}

/// Everything on the formation canvas
#[derive(Debug, Default)]
pub struct Scene {
    performers: BTreeMap<PerformerId, PerformerDot>,
    groups: Vec<SegmentGroup>,
    active: ActiveSelection,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a performer graphic, replacing one with the same performer id
    pub fn add_performer(&mut self, dot: PerformerDot) {
        self.performers.insert(dot.performer(), dot);
    }

    pub fn remove_performer(&mut self, performer: PerformerId, host: &mut dyn SceneHost) {
        if self.performers.remove(&performer).is_some() {
            host.remove_from_scene(super::SceneKey::Performer(performer));
        }
    }

    pub fn performer(&self, performer: PerformerId) -> Result<&PerformerDot> {
        self.performers
            .get(&performer)
            .ok_or(FormationError::UnknownPerformer(performer))
    }

    fn performer_mut(&mut self, performer: PerformerId) -> Result<&mut PerformerDot> {
        self.performers
            .get_mut(&performer)
            .ok_or(FormationError::UnknownPerformer(performer))
    }

    pub fn performers(&self) -> impl Iterator<Item = &PerformerDot> {
        self.performers.values()
    }

    /// Rebuild every standard performer graphic from `settings`
    pub fn restyle_performers(&mut self, settings: &FieldSettings) {
        for dot in self.performers.values_mut() {
            dot.restyle(settings);
        }
    }

    pub fn add_group(&mut self, group: SegmentGroup) -> EntityId {
        let id = group.id();
        self.groups.push(group);
        id
    }

    pub fn remove_group(&mut self, id: EntityId, host: &mut dyn SceneHost) -> Result<()> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id() == id)
            .ok_or(FormationError::UnknownGroup(id))?;
        let mut group = self.groups.remove(index);
        group.destroy(host);
        Ok(())
    }

    pub fn group(&self, id: EntityId) -> Result<&SegmentGroup> {
        self.groups
            .iter()
            .find(|g| g.id() == id)
            .ok_or(FormationError::UnknownGroup(id))
    }

    pub fn group_mut(&mut self, id: EntityId) -> Result<&mut SegmentGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.id() == id)
            .ok_or(FormationError::UnknownGroup(id))
    }

    pub fn groups(&self) -> &[SegmentGroup] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [SegmentGroup] {
        &mut self.groups
    }

    /// The group a performer rides on, if any
    pub fn group_of(&self, performer: PerformerId) -> Option<EntityId> {
        self.groups
            .iter()
            .find(|g| g.contains(performer))
            .map(SegmentGroup::id)
    }

    pub fn active(&self) -> &ActiveSelection {
        &self.active
    }

    /// The coordinate transform that currently applies to `performer`
    pub fn transform_for(
        &self,
        performer: PerformerId,
        settings: &FieldSettings,
    ) -> Result<CoordinateTransform> {
        CoordinateTransform::for_performer(self.performer(performer)?, &self.active, settings)
    }

    /// Bind `point` to its performer and draw the performer there
    pub fn place_performer(
        &mut self,
        point: FormationPoint,
        settings: &FieldSettings,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        self.place_on(point.performer, point, settings, host)
    }

    /// Bind `point` to the graphic of `performer`, which must be the
    /// performer the point belongs to
    fn place_on(
        &mut self,
        performer: PerformerId,
        point: FormationPoint,
        settings: &FieldSettings,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        self.performer_mut(performer)?.bind(point)?;
        self.show_performer_at(performer, point.point(), settings, host)
    }

    /// Draw `performer` at formation coordinates `formation` without
    /// changing the point it is bound to
    pub fn show_performer_at(
        &mut self,
        performer: PerformerId,
        formation: Point,
        settings: &FieldSettings,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        let render = self.transform_for(performer, settings)?.to_render(formation);
        self.set_render_position(performer, render, host)
    }

    /// Move a performer graphic directly in render coordinates
    pub fn set_render_position(
        &mut self,
        performer: PerformerId,
        render: Point,
        host: &mut dyn SceneHost,
    ) -> Result<()> {
        self.performer_mut(performer)?.set_render_position(render);
        self.publish(performer, host)
    }

    /// Place a whole page of formation points. Problems with individual
    /// performers are logged and the rest of the page is still placed.
    /// Returns how many performers were placed.
    pub fn render_page(
        &mut self,
        page: &FormationPage,
        settings: &FieldSettings,
        host: &mut dyn SceneHost,
    ) -> usize {
        let mut placed = 0;
        for (&performer, point) in page {
            match self.place_on(performer, *point, settings, host) {
                Ok(()) => placed += 1,
                Err(err @ FormationError::MissingAnchor(_)) => {
                    tracing::error!("Skipping performer: {err}");
                }
                Err(err) => tracing::warn!("Skipping performer: {err}"),
            }
        }
        host.request_redraw();
        placed
    }

    /// The formation coordinates a performer is currently drawn at
    pub fn formation_of(&self, performer: PerformerId, settings: &FieldSettings) -> Result<Point> {
        let render = self.performer(performer)?.render_position()?;
        Ok(self.transform_for(performer, settings)?.to_formation(render))
    }

    /// Hand a performer's absolute scene description to the host
    fn publish(&self, performer: PerformerId, host: &mut dyn SceneHost) -> Result<()> {
        let origin = self.active.group_offset(performer);
        let object = self.performer(performer)?.scene_object(origin)?;
        host.add_to_scene(object);
        Ok(())
    }

    fn selectable(&self, target: CanvasRef) -> Option<&dyn Selectable> {
        match target {
            CanvasRef::Performer(id) => self.performers.get(&id).map(|d| d as &dyn Selectable),
            CanvasRef::Handle(id) => self
                .groups
                .iter()
                .flat_map(|g| g.controller().handles())
                .find(|h| h.id == id)
                .map(|h| h as &dyn Selectable),
            CanvasRef::Curve(id) => self
                .groups
                .iter()
                .find(|g| g.id() == id)
                .map(|g| g as &dyn Selectable),
        }
    }

    /// Bounds of `target` in absolute render coordinates
    pub fn absolute_bounds(&self, target: CanvasRef) -> Option<Rect> {
        let bounds = self.selectable(target)?.bounds();
        Some(match target {
            CanvasRef::Performer(id) => bounds + self.active.group_offset(id),
            _ => bounds,
        })
    }

    /// Replace the active selection. Several targets form a group around
    /// the center of their combined bounds.
    pub fn select(&mut self, targets: Vec<CanvasRef>) {
        if let ActiveSelection::Group { members, center } = std::mem::take(&mut self.active) {
            self.shift_performers(&members, center.to_vec2());
        }

        self.active = match targets.len() {
            0 => ActiveSelection::None,
            1 => ActiveSelection::Single(targets[0]),
            _ => {
                let center = targets
                    .iter()
                    .filter_map(|t| self.absolute_bounds(*t))
                    .reduce(|a, b| a.union(b))
                    .unwrap_or(Rect::ZERO)
                    .center();
                self.shift_performers(&targets, -center.to_vec2());
                ActiveSelection::Group {
                    members: targets,
                    center,
                }
            }
        };
    }

    fn shift_performers(&mut self, members: &[CanvasRef], delta: Vec2) {
        for member in members {
            if let CanvasRef::Performer(id) = member {
                if let Some(dot) = self.performers.get_mut(id) {
                    dot.shift(delta);
                }
            }
        }
    }

    /// Performers in the active selection
    pub fn selected_performers(&self) -> Vec<PerformerId> {
        self.active
            .members()
            .iter()
            .filter_map(|m| match m {
                CanvasRef::Performer(id) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl SelectionCanvas for Scene {
    fn active_objects(&self) -> Vec<&dyn Selectable> {
        self.active
            .members()
            .iter()
            .filter_map(|m| self.selectable(*m))
            .collect()
    }

    fn resolve(&self, class_tag: ClassTag, external_id: u64) -> Option<CanvasRef> {
        let target = match class_tag {
            ClassTag::Performer => CanvasRef::Performer(PerformerId(external_id)),
            ClassTag::CurvePoint => CanvasRef::Handle(
                self.groups
                    .iter()
                    .flat_map(|g| g.controller().handles())
                    .find(|h| h.id.raw() == external_id)?
                    .id,
            ),
            ClassTag::Curve => CanvasRef::Curve(
                self.groups
                    .iter()
                    .find(|g| g.id().raw() == external_id)?
                    .id(),
            ),
        };
        self.selectable(target).map(|_| target)
    }

    fn identity_of(&self, target: CanvasRef) -> Option<Identity> {
        self.selectable(target)?.identity()
    }

    fn set_active_objects(&mut self, targets: Vec<CanvasRef>) {
        self.select(targets);
    }
}
