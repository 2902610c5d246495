// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Splitting a path into independently measurable segments.
//!
//! A segment is a two-command path: a Move to where the pen stands plus one
//! drawing command. Each segment starts where the previous one ended, so
//! laying the segments end to end redraws the original curve.

use super::command::PathCommand;
use super::Path;
use kurbo::{CubicBez, Line, ParamCurve, PathSeg, Point, QuadBez};
use std::fmt;

/// One `Move + drawing command` piece of a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubPath {
    /// Index of the drawing command in the source path
    pub command_index: usize,
    /// Where the pen stands before the command
    pub start: Point,
    /// The drawing command; a Close is stored as a Line back to the
    /// subpath's starting point
    pub command: PathCommand,
    /// Whether this segment came from a Close command
    pub closing: bool,
}

impl SubPath {
    /// The kurbo segment used for measuring and sampling
    pub fn to_seg(&self) -> PathSeg {
        match self.command {
            PathCommand::Line(p) => PathSeg::Line(Line::new(self.start, p)),
            PathCommand::Quadratic(c, p) => PathSeg::Quad(QuadBez::new(self.start, c, p)),
            PathCommand::Cubic(c1, c2, p) => {
                PathSeg::Cubic(CubicBez::new(self.start, c1, c2, p))
            }
            // Never produced by `split_into_segments`
            PathCommand::Move(p) => PathSeg::Line(Line::new(p, p)),
            PathCommand::Close => PathSeg::Line(Line::new(self.start, self.start)),
        }
    }

    /// Where the segment ends
    pub fn end(&self) -> Point {
        self.to_seg().end()
    }

    /// The segment as a standalone two-command path
    pub fn to_path(&self) -> Path {
        Path::from_commands_unchecked(vec![PathCommand::Move(self.start), self.command])
    }
}

impl fmt::Display for SubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// Split `commands` into segments, one per drawing command
pub(crate) fn split_commands(commands: &[PathCommand]) -> Vec<SubPath> {
    let mut segments = Vec::new();
    let mut pen = Point::ZERO;
    let mut subpath_start = Point::ZERO;

    for (command_index, command) in commands.iter().enumerate() {
        match *command {
            PathCommand::Move(p) => {
                pen = p;
                subpath_start = p;
            }
            PathCommand::Close => {
                segments.push(SubPath {
                    command_index,
                    start: pen,
                    command: PathCommand::Line(subpath_start),
                    closing: true,
                });
                pen = subpath_start;
            }
            drawing => {
                segments.push(SubPath {
                    command_index,
                    start: pen,
                    command: drawing,
                    closing: false,
                });
                if let Some(end) = drawing.end_point() {
                    pen = end;
                }
            }
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_segment_starts_where_the_last_ended() {
        let path = Path::parse("M 0 0 L 10 0 Q 15 5 20 0 C 25 5 30 5 35 0").unwrap();
        let segments = path.split_into_segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].to_string(), "M 0 0 L 10 0");
        assert_eq!(segments[1].to_string(), "M 10 0 Q 15 5 20 0");
        assert_eq!(segments[2].to_string(), "M 20 0 C 25 5 30 5 35 0");
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start);
        }
    }

    #[test]
    fn close_returns_to_subpath_start() {
        let path = Path::parse("M 0 0 L 10 0 L 10 10 Z").unwrap();
        let segments = path.split_into_segments();
        assert_eq!(segments.len(), 3);
        let closing = segments[2];
        assert!(closing.closing);
        assert_eq!(closing.start, Point::new(10.0, 10.0));
        assert_eq!(closing.end(), Point::new(0.0, 0.0));
        assert_eq!(closing.command_index, 3);
    }

    #[test]
    fn interior_move_starts_a_new_run() {
        let path = Path::parse("M 0 0 L 10 0 M 50 50 L 60 50").unwrap();
        let segments = path.split_into_segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].start, Point::new(50.0, 50.0));
    }

    #[test]
    fn move_only_path_has_no_segments() {
        let path = Path::parse("M 3 4").unwrap();
        assert!(path.split_into_segments().is_empty());
    }
}
