// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Drawing commands: the building blocks of a formation path.

use crate::error::{FormationError, Result};
use kurbo::{Point, Vec2};

/// The kind of a drawing command, independent of its coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Move,
    Line,
    Quadratic,
    Cubic,
    Close,
}

impl CommandKind {
    /// Number of coordinate pairs a command of this kind carries
    pub fn coordinate_pairs(self) -> usize {
        match self {
            CommandKind::Move | CommandKind::Line => 1,
            CommandKind::Quadratic => 2,
            CommandKind::Cubic => 3,
            CommandKind::Close => 0,
        }
    }

    /// The upper-case (absolute) path letter
    pub fn letter(self) -> char {
        match self {
            CommandKind::Move => 'M',
            CommandKind::Line => 'L',
            CommandKind::Quadratic => 'Q',
            CommandKind::Cubic => 'C',
            CommandKind::Close => 'Z',
        }
    }

    /// Look up a path letter. Returns the kind and whether the letter was
    /// the relative (lower-case) form.
    pub fn from_letter(letter: char) -> Option<(Self, bool)> {
        let kind = match letter.to_ascii_uppercase() {
            'M' => CommandKind::Move,
            'L' => CommandKind::Line,
            'Q' => CommandKind::Quadratic,
            'C' => CommandKind::Cubic,
            'Z' => CommandKind::Close,
            _ => return None,
        };
        Some((kind, letter.is_ascii_lowercase()))
    }
}

/// One drawing command with its coordinate pairs
///
/// Coordinate slots are numbered in drawing order: a quadratic's control
/// point is slot 0 and its end point slot 1, a cubic's end point is slot 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Move(Point),
    Line(Point),
    Quadratic(Point, Point),
    Cubic(Point, Point, Point),
    Close,
}

impl PathCommand {
    /// Build a command from a kind and raw coordinate pairs, checking that
    /// the pair count matches the kind.
    pub fn from_coordinates(kind: CommandKind, coords: &[Point]) -> Result<Self> {
        let expected = kind.coordinate_pairs();
        if coords.len() != expected {
            return Err(FormationError::MalformedCommand {
                kind,
                expected,
                found: coords.len(),
            });
        }
        Ok(match kind {
            CommandKind::Move => PathCommand::Move(coords[0]),
            CommandKind::Line => PathCommand::Line(coords[0]),
            CommandKind::Quadratic => PathCommand::Quadratic(coords[0], coords[1]),
            CommandKind::Cubic => PathCommand::Cubic(coords[0], coords[1], coords[2]),
            CommandKind::Close => PathCommand::Close,
        })
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            PathCommand::Move(_) => CommandKind::Move,
            PathCommand::Line(_) => CommandKind::Line,
            PathCommand::Quadratic(..) => CommandKind::Quadratic,
            PathCommand::Cubic(..) => CommandKind::Cubic,
            PathCommand::Close => CommandKind::Close,
        }
    }

    /// Number of coordinate pairs this command carries
    pub fn len(&self) -> usize {
        self.kind().coordinate_pairs()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The coordinate pair in `slot`, if the command has one there
    pub fn coordinate(&self, slot: usize) -> Option<Point> {
        match (self, slot) {
            (PathCommand::Move(p) | PathCommand::Line(p), 0) => Some(*p),
            (PathCommand::Quadratic(c, _), 0) => Some(*c),
            (PathCommand::Quadratic(_, p), 1) => Some(*p),
            (PathCommand::Cubic(c1, _, _), 0) => Some(*c1),
            (PathCommand::Cubic(_, c2, _), 1) => Some(*c2),
            (PathCommand::Cubic(_, _, p), 2) => Some(*p),
            _ => None,
        }
    }

    /// Mutable access to the coordinate pair in `slot`
    pub fn coordinate_mut(&mut self, slot: usize) -> Option<&mut Point> {
        match (self, slot) {
            (PathCommand::Move(p) | PathCommand::Line(p), 0) => Some(p),
            (PathCommand::Quadratic(c, _), 0) => Some(c),
            (PathCommand::Quadratic(_, p), 1) => Some(p),
            (PathCommand::Cubic(c1, _, _), 0) => Some(c1),
            (PathCommand::Cubic(_, c2, _), 1) => Some(c2),
            (PathCommand::Cubic(_, _, p), 2) => Some(p),
            _ => None,
        }
    }

    /// All coordinate pairs in slot order
    pub fn coordinates(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.len()).filter_map(move |slot| self.coordinate(slot))
    }

    /// The point the pen ends up on, `None` for Close
    pub fn end_point(&self) -> Option<Point> {
        match self {
            PathCommand::Move(p) | PathCommand::Line(p) => Some(*p),
            PathCommand::Quadratic(_, p) | PathCommand::Cubic(_, _, p) => Some(*p),
            PathCommand::Close => None,
        }
    }

    /// A copy of this command with every coordinate shifted by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        let mut out = *self;
        for slot in 0..out.len() {
            if let Some(p) = out.coordinate_mut(slot) {
                *p += offset;
            }
        }
        out
    }
}
