// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Path model for formation lines: the editable representation.
//!
//! A `Path` is an ordered list of drawing commands, stored behind an `Arc`
//! so snapshots are cheap to clone and copy-on-write when edited. Paths
//! parse from and serialize to SVG path data, split into per-command
//! segments for distribution, and convert to `kurbo::BezPath` for drawing.

pub mod command;
pub mod measure;
pub mod segment;
pub mod svg;

pub use command::{CommandKind, PathCommand};
pub use measure::{KurboMeasure, PathMeasure};
pub use segment::SubPath;

use crate::error::{FormationError, Result};
use kurbo::{BezPath, Point, Rect, Shape, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A formation line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    commands: Arc<Vec<PathCommand>>,
}

impl Path {
    /// Build a path from commands. A non-empty path must start with a Move.
    pub fn new(commands: Vec<PathCommand>) -> Result<Self> {
        match commands.first() {
            None | Some(PathCommand::Move(_)) => Ok(Self::from_commands_unchecked(commands)),
            Some(_) => Err(FormationError::MissingInitialMove),
        }
    }

    pub(crate) fn from_commands_unchecked(commands: Vec<PathCommand>) -> Self {
        Self {
            commands: Arc::new(commands),
        }
    }

    /// Parse SVG path data
    pub fn parse(text: &str) -> Result<Self> {
        Self::new(svg::parse_commands(text)?)
    }

    /// A straight line from `start` to `end`
    pub fn line(start: Point, end: Point) -> Self {
        Self::from_commands_unchecked(vec![PathCommand::Move(start), PathCommand::Line(end)])
    }

    /// Serialize as SVG path data
    pub fn to_svg(&self) -> String {
        svg::write_commands(&self.commands)
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Total number of coordinate pairs, i.e. the number of control handles
    pub fn handle_count(&self) -> usize {
        self.commands.iter().map(PathCommand::len).sum()
    }

    /// The coordinate pair at `slot` of command `index`
    pub fn coordinate(&self, index: usize, slot: usize) -> Option<Point> {
        self.commands.get(index).and_then(|c| c.coordinate(slot))
    }

    /// Overwrite one coordinate pair in place.
    ///
    /// Fails with `SegmentIndexOutOfRange` when the command or slot does
    /// not exist.
    pub fn set_coordinate(&mut self, index: usize, slot: usize, point: Point) -> Result<()> {
        let len = self.commands.len();
        let target = Arc::make_mut(&mut self.commands)
            .get_mut(index)
            .and_then(|c| c.coordinate_mut(slot))
            .ok_or(FormationError::SegmentIndexOutOfRange { index, len })?;
        *target = point;
        Ok(())
    }

    /// A copy of this path with every coordinate shifted by `(dx, dy)`
    pub fn apply_offset(&self, dx: f64, dy: f64) -> Path {
        Self::from_commands_unchecked(svg::offset_commands(&self.commands, Vec2::new(dx, dy)))
    }

    /// One segment per drawing command; see [`SubPath`]
    pub fn split_into_segments(&self) -> Vec<SubPath> {
        segment::split_commands(&self.commands)
    }

    /// Replace command `index` with a command of `kind` ending at the same
    /// point. Quadratic controls go to the chord midpoint, cubic controls to
    /// the chord thirds. The leading Move cannot be changed.
    pub fn with_command_kind(&self, index: usize, kind: CommandKind) -> Result<Path> {
        let len = self.commands.len();
        if index == 0 || index >= len {
            return Err(FormationError::SegmentIndexOutOfRange { index, len });
        }

        let (start, end) = self.command_span(index);
        let replacement = match kind {
            CommandKind::Move => PathCommand::Move(end),
            CommandKind::Line => PathCommand::Line(end),
            CommandKind::Quadratic => PathCommand::Quadratic(start.midpoint(end), end),
            CommandKind::Cubic => PathCommand::Cubic(
                start.lerp(end, 1.0 / 3.0),
                start.lerp(end, 2.0 / 3.0),
                end,
            ),
            CommandKind::Close => PathCommand::Close,
        };

        let mut commands = self.commands.as_ref().clone();
        commands[index] = replacement;
        Ok(Self::from_commands_unchecked(commands))
    }

    /// Pen position before and after command `index`
    fn command_span(&self, index: usize) -> (Point, Point) {
        let mut pen = Point::ZERO;
        let mut subpath_start = Point::ZERO;
        for (i, command) in self.commands.iter().enumerate() {
            let end = match command {
                PathCommand::Move(p) => {
                    subpath_start = *p;
                    *p
                }
                PathCommand::Close => subpath_start,
                other => other.end_point().unwrap_or(pen),
            };
            if i == index {
                return (pen, end);
            }
            pen = end;
        }
        (pen, pen)
    }

    /// Two paths are visually equal when they serialize to the same text
    pub fn equals_visually(&self, other: &Path) -> bool {
        self.to_svg() == other.to_svg()
    }

    /// Convert to a kurbo BezPath for rendering
    pub fn to_bezpath(&self) -> BezPath {
        let mut bez = BezPath::new();
        for command in self.commands.iter() {
            match *command {
                PathCommand::Move(p) => bez.move_to(p),
                PathCommand::Line(p) => bez.line_to(p),
                PathCommand::Quadratic(c, p) => bez.quad_to(c, p),
                PathCommand::Cubic(c1, c2, p) => bez.curve_to(c1, c2, p),
                PathCommand::Close => bez.close_path(),
            }
        }
        bez
    }

    /// Tight bounds of the drawn curve
    pub fn bounding_box(&self) -> Rect {
        if self.is_empty() {
            return Rect::ZERO;
        }
        self.to_bezpath().bounding_box()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg())
    }
}

impl FromStr for Path {
    type Err = FormationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = FormationError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_svg()
    }
}
