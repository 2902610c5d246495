// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! The on-canvas graphic for one performer: a dot with a label above it.
//!
//! The graphic is positioned by its registration point, the center of the
//! bounding box around all of its parts. The formation point, however,
//! names where the dot should be. The distance between the two is the
//! anchor offset used by the coordinate transform.

use super::host::SceneObject;
use crate::editing::{ClassTag, Identity, Selectable};
use crate::error::{FormationError, Result};
use crate::model::{FormationPoint, PerformerId};
use crate::settings::{self, FieldSettings};
use kurbo::{Point, Rect, Size, Vec2};

/// One drawable part of a performer graphic, in local coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicPart {
    Dot { center: Point, radius: f64 },
    Label { center: Point, size: Size },
}

impl GraphicPart {
    fn bounds(&self) -> Rect {
        match self {
            GraphicPart::Dot { center, radius } => {
                Rect::from_center_size(*center, Size::new(radius * 2.0, radius * 2.0))
            }
            GraphicPart::Label { center, size } => Rect::from_center_size(*center, *size),
        }
    }
}

fn standard_parts(label: &str, settings: &FieldSettings) -> Vec<GraphicPart> {
    let radius = settings.dot_radius;
    let char_count = label.chars().count().max(1) as f64;
    let label_size = Size::new(
        char_count * settings.label_font_size * settings::performer::LABEL_CHAR_ADVANCE,
        settings.label_font_size,
    );
    vec![
        GraphicPart::Dot {
            center: Point::ZERO,
            radius,
        },
        GraphicPart::Label {
            center: Point::new(0.0, -radius * settings.label_offset_factor),
            size: label_size,
        },
    ]
}

/// A performer on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PerformerDot {
    performer: PerformerId,
    label: String,
    parts: Vec<GraphicPart>,
    /// Built from the settings rather than from custom parts
    styled: bool,
    /// Render position of the registration point. While the performer is
    /// part of a multi-selection this is relative to the group center.
    position: Option<Point>,
    bound: Option<FormationPoint>,
}

impl PerformerDot {
    /// The standard dot-and-label graphic
    pub fn new(performer: PerformerId, label: impl Into<String>, settings: &FieldSettings) -> Self {
        let label = label.into();
        let parts = standard_parts(&label, settings);
        Self {
            styled: true,
            ..Self::from_parts(performer, label, parts)
        }
    }

    /// A graphic built from arbitrary parts
    pub fn from_parts(
        performer: PerformerId,
        label: impl Into<String>,
        parts: Vec<GraphicPart>,
    ) -> Self {
        Self {
            performer,
            label: label.into(),
            parts,
            styled: false,
            position: None,
            bound: None,
        }
    }

    /// Rebuild a standard graphic's parts from `settings`.
    ///
    /// A placed graphic keeps its dot where it was drawn. Graphics built
    /// from custom parts are left alone.
    pub fn restyle(&mut self, settings: &FieldSettings) {
        if !self.styled {
            return;
        }
        let dot = match (self.position, self.anchor_offset()) {
            (Some(position), Ok(anchor)) => Some(position + anchor),
            _ => None,
        };
        self.parts = standard_parts(&self.label, settings);
        if let (Some(dot), Ok(anchor)) = (dot, self.anchor_offset()) {
            self.position = Some(dot - anchor);
        }
    }

    pub fn performer(&self) -> PerformerId {
        self.performer
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parts(&self) -> &[GraphicPart] {
        &self.parts
    }

    fn local_bounds(&self) -> Rect {
        let mut iter = self.parts.iter().map(GraphicPart::bounds);
        let first = iter.next().unwrap_or(Rect::ZERO);
        iter.fold(first, |acc, r| acc.union(r))
    }

    /// Dot center relative to the registration point
    pub fn anchor_offset(&self) -> Result<Vec2> {
        let dot = self
            .parts
            .iter()
            .find_map(|part| match part {
                GraphicPart::Dot { center, .. } => Some(*center),
                GraphicPart::Label { .. } => None,
            })
            .ok_or(FormationError::MissingAnchor(self.performer))?;
        Ok(dot - self.local_bounds().center())
    }

    /// Where the registration point is drawn
    pub fn render_position(&self) -> Result<Point> {
        self.position
            .ok_or(FormationError::MissingCoordinates(self.performer))
    }

    pub fn set_render_position(&mut self, position: Point) {
        self.position = Some(position);
    }

    /// Move an already placed graphic by `delta`; unplaced graphics stay
    /// unplaced
    pub(crate) fn shift(&mut self, delta: Vec2) {
        if let Some(position) = self.position.as_mut() {
            *position += delta;
        }
    }

    /// Attach the formation point this graphic displays
    pub fn bind(&mut self, point: FormationPoint) -> Result<()> {
        if point.performer != self.performer {
            return Err(FormationError::StructuralMismatch {
                entity: self.performer,
                bound: point.performer,
            });
        }
        self.bound = Some(point);
        Ok(())
    }

    pub fn bound_point(&self) -> Option<FormationPoint> {
        self.bound
    }

    /// Scene description with the graphic placed at `origin + position`
    pub(crate) fn scene_object(&self, origin: Vec2) -> Result<SceneObject> {
        let position = self.render_position()? + origin;
        let anchor = self.anchor_offset()?;
        Ok(SceneObject::Performer {
            performer: self.performer,
            label: self.label.clone(),
            dot_center: position + anchor,
            bounds: Rect::from_center_size(position, self.local_bounds().size()),
        })
    }
}

impl Selectable for PerformerDot {
    fn identity(&self) -> Option<Identity> {
        let id = self.performer.raw();
        Some(Identity::new(ClassTag::Performer, id, id))
    }

    /// Bounds around the registration point; an unplaced graphic is
    /// centered on the origin
    fn bounds(&self) -> Rect {
        let center = self.position.unwrap_or(Point::ZERO);
        Rect::from_center_size(center, self.local_bounds().size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(id: u64) -> PerformerDot {
        PerformerDot::new(PerformerId(id), "A1", &FieldSettings::default())
    }

    #[test]
    fn anchor_points_from_registration_to_dot() {
        // Dot spans y -5..5, label spans y -18..-4, so the box center is
        // at y = -6.5 and the dot sits 6.5 below it.
        let anchor = dot(1).anchor_offset().unwrap();
        assert!(anchor.x.abs() < 1e-9);
        assert!((anchor.y - 6.5).abs() < 1e-9);
    }

    #[test]
    fn restyle_follows_new_dot_radius_and_keeps_dot_in_place() {
        let mut graphic = dot(1);
        graphic.set_render_position(Point::new(100.0, 100.0));
        let before = graphic.anchor_offset().unwrap();
        let dot_before = Point::new(100.0, 100.0) + before;

        let settings = FieldSettings {
            dot_radius: 20.0,
            ..FieldSettings::default()
        };
        graphic.restyle(&settings);
        let after = graphic.anchor_offset().unwrap();
        assert!((after.y - before.y).abs() > 1.0);
        let dot_after = graphic.render_position().unwrap() + after;
        assert!((dot_after - dot_before).hypot() < 1e-9);
    }

    #[test]
    fn restyle_leaves_custom_graphics_alone() {
        let parts = vec![GraphicPart::Dot {
            center: Point::ZERO,
            radius: 2.0,
        }];
        let mut graphic = PerformerDot::from_parts(PerformerId(3), "C", parts.clone());
        graphic.restyle(&FieldSettings::default());
        assert_eq!(graphic.parts(), parts.as_slice());
    }

    #[test]
    fn graphic_without_dot_has_no_anchor() {
        let label_only = PerformerDot::from_parts(
            PerformerId(4),
            "B2",
            vec![GraphicPart::Label {
                center: Point::ZERO,
                size: Size::new(10.0, 10.0),
            }],
        );
        assert_eq!(
            label_only.anchor_offset(),
            Err(FormationError::MissingAnchor(PerformerId(4)))
        );
    }

    #[test]
    fn unplaced_graphic_has_no_coordinates() {
        assert_eq!(
            dot(2).render_position(),
            Err(FormationError::MissingCoordinates(PerformerId(2)))
        );
    }

    #[test]
    fn binding_another_performers_point_is_rejected() {
        let mut graphic = dot(1);
        let err = graphic
            .bind(FormationPoint::new(PerformerId(2), 0.0, 0.0))
            .unwrap_err();
        assert_eq!(
            err,
            FormationError::StructuralMismatch {
                entity: PerformerId(1),
                bound: PerformerId(2),
            }
        );
        assert!(graphic.bound_point().is_none());
    }

    #[test]
    fn scene_object_puts_dot_at_anchor() {
        let mut graphic = dot(1);
        graphic.set_render_position(Point::new(10.0, 10.0));
        match graphic.scene_object(Vec2::ZERO).unwrap() {
            SceneObject::Performer { dot_center, .. } => {
                assert!((dot_center - Point::new(10.0, 16.5)).hypot() < 1e-9);
            }
            other => panic!("unexpected scene object {other:?}"),
        }
    }
}
