// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Reading and writing SVG path data.
//!
//! Only the commands a formation path can hold are accepted: `M L Q C Z`
//! and their relative lower-case forms. Relative coordinates are resolved
//! against the current pen position while parsing, so a parsed path is
//! always absolute. Extra coordinate groups after a command repeat it, with
//! a repeated Move drawing lines, as in SVG. Tokenizing is done by
//! `svgtypes`.

use super::command::{CommandKind, PathCommand};
use crate::error::{FormationError, Result};
use kurbo::{Point, Vec2};
use std::fmt::Write;
use svgtypes::{NumberListParser, PathParser, PathSegment};

/// Reject characters that can never appear in a formation path
fn check_characters(text: &str) -> Result<()> {
    let stray = text.chars().find(|&c| {
        let numeric = c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E');
        let separator = c.is_ascii_whitespace() || c == ',';
        !numeric && !separator && CommandKind::from_letter(c).is_none()
    });
    match stray {
        Some(c) => Err(FormationError::UnknownCommand(c.to_string())),
        None => Ok(()),
    }
}

/// Describe a parse failure in terms of the command that was being read.
///
/// `error_at` is the byte offset the parser stopped at. The command is the
/// last letter before it; `found` counts the complete pairs of the
/// unfinished coordinate group.
fn malformed_at(text: &str, error_at: usize) -> FormationError {
    let head = &text[..error_at];
    let (kind, args) = head
        .char_indices()
        .rev()
        .find_map(|(i, c)| CommandKind::from_letter(c).map(|(kind, _)| (kind, i + 1)))
        .unwrap_or((CommandKind::Move, 0));
    let numbers = NumberListParser::from(&head[args..])
        .take_while(|n| n.is_ok())
        .count();
    let expected = kind.coordinate_pairs();
    let found = if expected == 0 {
        numbers / 2
    } else {
        (numbers / 2) % expected
    };
    FormationError::MalformedCommand {
        kind,
        expected,
        found,
    }
}

fn error_offset(text: &str, error: &svgtypes::Error) -> usize {
    match error {
        // Positions are one-based character positions
        svgtypes::Error::UnexpectedData(pos) => text
            .char_indices()
            .nth(pos.saturating_sub(1))
            .map(|(i, _)| i)
            .unwrap_or(text.len()),
        _ => text.len(),
    }
}

fn unsupported_letter(segment: &PathSegment) -> char {
    let (abs, letter) = match segment {
        PathSegment::HorizontalLineTo { abs, .. } => (*abs, 'H'),
        PathSegment::VerticalLineTo { abs, .. } => (*abs, 'V'),
        PathSegment::SmoothCurveTo { abs, .. } => (*abs, 'S'),
        PathSegment::SmoothQuadratic { abs, .. } => (*abs, 'T'),
        PathSegment::EllipticalArc { abs, .. } => (*abs, 'A'),
        PathSegment::MoveTo { abs, .. } => (*abs, 'M'),
        PathSegment::LineTo { abs, .. } => (*abs, 'L'),
        PathSegment::CurveTo { abs, .. } => (*abs, 'C'),
        PathSegment::Quadratic { abs, .. } => (*abs, 'Q'),
        PathSegment::ClosePath { abs } => (*abs, 'Z'),
    };
    if abs { letter } else { letter.to_ascii_lowercase() }
}

/// Parse SVG path data into absolute commands
pub fn parse_commands(text: &str) -> Result<Vec<PathCommand>> {
    check_characters(text)?;
    match text.trim_start().chars().next() {
        None => return Ok(Vec::new()),
        Some('M' | 'm') => {}
        Some(_) => return Err(FormationError::MissingInitialMove),
    }

    let mut commands = Vec::new();
    let mut pen = Point::ZERO;
    let mut subpath_start = Point::ZERO;

    for segment in PathParser::from(text) {
        let segment = segment.map_err(|err| malformed_at(text, error_offset(text, &err)))?;
        let resolve = |abs: bool, x: f64, y: f64| {
            if abs {
                Point::new(x, y)
            } else {
                Point::new(pen.x + x, pen.y + y)
            }
        };
        let command = match segment {
            PathSegment::MoveTo { abs, x, y } => PathCommand::Move(resolve(abs, x, y)),
            PathSegment::LineTo { abs, x, y } => PathCommand::Line(resolve(abs, x, y)),
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                PathCommand::Quadratic(resolve(abs, x1, y1), resolve(abs, x, y))
            }
            PathSegment::CurveTo {
                abs,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => PathCommand::Cubic(
                resolve(abs, x1, y1),
                resolve(abs, x2, y2),
                resolve(abs, x, y),
            ),
            PathSegment::ClosePath { .. } => PathCommand::Close,
            other => {
                return Err(FormationError::UnknownCommand(
                    unsupported_letter(&other).to_string(),
                ));
            }
        };

        match command {
            PathCommand::Move(p) => {
                pen = p;
                subpath_start = p;
            }
            PathCommand::Close => pen = subpath_start,
            other => {
                if let Some(end) = other.end_point() {
                    pen = end;
                }
            }
        }
        commands.push(command);
    }

    Ok(commands)
}

/// Write commands as SVG path data: `M 0 0 Q 50 100 100 0`
pub fn write_commands(commands: &[PathCommand]) -> String {
    let mut out = String::new();
    for (i, command) in commands.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(command.kind().letter());
        for p in command.coordinates() {
            let _ = write!(out, " {} {}", fmt_number(p.x), fmt_number(p.y));
        }
    }
    out
}

fn fmt_number(value: f64) -> f64 {
    // Avoid writing "-0"
    if value == 0.0 { 0.0 } else { value }
}

/// Shift every coordinate of `commands` by `offset`
pub(crate) fn offset_commands(commands: &[PathCommand], offset: Vec2) -> Vec<PathCommand> {
    commands.iter().map(|c| c.translated(offset)).collect()
}
