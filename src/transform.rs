// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Mapping between formation coordinates and render coordinates.
//!
//! Formation coordinates say where a performer's dot is on the field.
//! Render coordinates say where the performer graphic's registration point
//! is drawn. Three offsets separate them:
//!
//! - the anchor offset, from registration point to dot center
//! - the grid offset, half a grid stroke so dots sit on grid lines
//! - the group offset, the selection center, while the performer is part
//!   of a multi-selection (positions inside a group are group-relative)
//!
//! ```text
//! render    = formation - group - anchor + grid
//! formation = render    + group + anchor - grid
//! ```

use crate::canvas::{ActiveSelection, PerformerDot};
use crate::error::Result;
use crate::settings::FieldSettings;
use kurbo::{Point, Vec2};

/// Formation point to render position
pub fn formation_to_render(formation: Point, group: Vec2, anchor: Vec2, grid: f64) -> Point {
    formation - group - anchor + Vec2::new(grid, grid)
}

/// Render position to formation point
pub fn render_to_formation(render: Point, group: Vec2, anchor: Vec2, grid: f64) -> Point {
    render + group + anchor - Vec2::new(grid, grid)
}

/// The offsets that apply to one performer at one moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    pub anchor: Vec2,
    pub group: Vec2,
    pub grid: f64,
}

impl CoordinateTransform {
    pub fn new(anchor: Vec2, group: Vec2, grid: f64) -> Self {
        Self {
            anchor,
            group,
            grid,
        }
    }

    /// The transform for `dot` given the current active selection.
    ///
    /// Fails with `MissingAnchor` when the graphic has no dot.
    pub fn for_performer(
        dot: &PerformerDot,
        active: &ActiveSelection,
        settings: &FieldSettings,
    ) -> Result<Self> {
        Ok(Self {
            anchor: dot.anchor_offset()?,
            group: active.group_offset(dot.performer()),
            grid: settings.grid_offset(),
        })
    }

    /// The same transform as if the performer were not in a group
    pub fn ungrouped(self) -> Self {
        Self {
            group: Vec2::ZERO,
            ..self
        }
    }

    pub fn to_render(&self, formation: Point) -> Point {
        formation_to_render(formation, self.group, self.anchor, self.grid)
    }

    pub fn to_formation(&self, render: Point) -> Point {
        render_to_formation(render, self.group, self.anchor, self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PerformerId;
    use proptest::prelude::*;

    #[test]
    fn offsets_apply_with_their_signs() {
        let transform =
            CoordinateTransform::new(Vec2::new(0.0, 6.5), Vec2::new(100.0, 50.0), 0.5);
        let render = transform.to_render(Point::new(150.0, 80.0));
        assert_eq!(render, Point::new(50.5, 24.0));
        assert_eq!(transform.to_formation(render), Point::new(150.0, 80.0));
    }

    #[test]
    fn ungrouped_performer_has_no_group_offset() {
        let settings = FieldSettings::default();
        let dot = PerformerDot::new(PerformerId(1), "A1", &settings);
        let transform =
            CoordinateTransform::for_performer(&dot, &ActiveSelection::None, &settings).unwrap();
        assert_eq!(transform.group, Vec2::ZERO);
        assert_eq!(transform.grid, 0.5);
        assert_eq!(transform.ungrouped(), transform);
    }

    proptest! {
        #[test]
        fn round_trip_is_identity(
            x in -1e4f64..1e4, y in -1e4f64..1e4,
            gx in -1e3f64..1e3, gy in -1e3f64..1e3,
            ax in -50f64..50.0, ay in -50f64..50.0,
            grid in 0f64..4.0,
        ) {
            let transform = CoordinateTransform::new(Vec2::new(ax, ay), Vec2::new(gx, gy), grid);
            let formation = Point::new(x, y);
            let back = transform.to_formation(transform.to_render(formation));
            prop_assert!((back - formation).hypot() < 1e-6);
        }
    }
}
