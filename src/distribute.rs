// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Spacing performers evenly along a formation line.
//!
//! The path is split into segments and every segment gets a share of the
//! performers proportional to its arc length, after each segment has been
//! given one performer for its starting point. Within a segment performers
//! are spaced evenly by arc length. The last segment also gets a performer
//! on its end point, so a line of `k` performers on a single segment has
//! one at each end and `k - 2` in between.

use crate::error::{FormationError, Result};
use crate::model::{FormationPoint, PerformerId};
use crate::path::{Path, PathMeasure};
use kurbo::Point;

/// Where one performer goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub performer: PerformerId,
    pub position: Point,
}

impl From<Placement> for FormationPoint {
    fn from(placement: Placement) -> Self {
        FormationPoint::new(placement.performer, placement.position.x, placement.position.y)
    }
}

/// Result of distributing performers along a path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    /// Placements in distribution order
    pub placements: Vec<Placement>,
    /// Number of slots allocated to each segment
    pub per_segment: Vec<usize>,
    /// Performers left over when rounding allocated too few slots
    pub unplaced: Vec<PerformerId>,
}

impl Distribution {
    pub fn formation_points(&self) -> Vec<FormationPoint> {
        self.placements.iter().copied().map(FormationPoint::from).collect()
    }
}

/// Split `count` performers across segments of the given lengths.
///
/// The result normally sums to `count`. Rounding can leave it off by one,
/// which is corrected; anything further is logged and returned as is.
pub fn allocate(lengths: &[f64], count: usize) -> Vec<usize> {
    let mut per_segment = vec![0usize; lengths.len()];
    let mut remaining = count;
    for slot in per_segment.iter_mut() {
        if remaining == 0 {
            break;
        }
        *slot = 1;
        remaining -= 1;
    }

    let total: f64 = lengths.iter().sum();
    let segment_count = lengths.len() as f64;
    for (slot, length) in per_segment.iter_mut().zip(lengths) {
        // Degenerate paths share equally
        let share = if total > 0.0 {
            length / total
        } else {
            1.0 / segment_count
        };
        *slot += (share * remaining as f64).round() as usize;
    }

    let allocated: usize = per_segment.iter().sum();
    if allocated == count + 1 {
        if let Some(index) = first_extreme(&per_segment, |a, b| a > b) {
            per_segment[index] -= 1;
        }
    } else if allocated + 1 == count {
        if let Some(index) = first_extreme(&per_segment, |a, b| a < b) {
            per_segment[index] += 1;
        }
    } else if allocated != count {
        let err = FormationError::DistributionMismatch {
            allocated,
            expected: count,
        };
        tracing::warn!("{err}; placing performers best-effort");
    }
    per_segment
}

/// Index of the first element for which no later element is `better`
fn first_extreme(values: &[usize], better: impl Fn(usize, usize) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some(current) if !better(value, values[current]) => {}
            _ => best = Some(index),
        }
    }
    best
}

/// Place `performers`, in order, along `path`.
///
/// Fails with `EmptyPath` when there are performers but the path has no
/// segments to put them on.
pub fn distribute_along_path<M>(
    performers: &[PerformerId],
    path: &Path,
    measure: &M,
) -> Result<Distribution>
where
    M: PathMeasure + ?Sized,
{
    if performers.is_empty() {
        return Ok(Distribution::default());
    }
    let segments = path.split_into_segments();
    if segments.is_empty() {
        return Err(FormationError::EmptyPath);
    }
    if performers.len() < segments.len() + 1 {
        tracing::warn!(
            "{} performers on {} segments: not every segment point gets a performer",
            performers.len(),
            segments.len()
        );
    }

    let lengths: Vec<f64> = segments.iter().map(|s| measure.measure_length(s)).collect();
    let per_segment = allocate(&lengths, performers.len());

    let mut placements = Vec::with_capacity(performers.len());
    let mut next = 0;
    let last = segments.len() - 1;
    'segments: for (index, (segment, &items)) in segments.iter().zip(&per_segment).enumerate() {
        // An open path's last segment also covers its end point. A closed
        // path ends where its first performer already stands.
        let includes_end = index == last && !segment.closing;
        // The point a Close returned to is taken by the subpath's first performer
        let after_close = index > 0 && {
            let previous = &segments[index - 1];
            previous.closing && previous.end() == segment.start
        };
        let first = usize::from(after_close);
        let divisor = (items + first).saturating_sub(usize::from(includes_end));
        let spacing = if divisor == 0 {
            0.0
        } else {
            lengths[index] / divisor as f64
        };
        for step in first..first + items {
            let Some(&performer) = performers.get(next) else {
                break 'segments;
            };
            placements.push(Placement {
                performer,
                position: measure.point_at_length(segment, spacing * step as f64),
            });
            next += 1;
        }
    }

    let unplaced = performers[next..].to_vec();
    if !unplaced.is_empty() {
        tracing::warn!("{} performers could not be placed", unplaced.len());
    }
    tracing::debug!(
        "Distributed {} performers over {} segments: {:?}",
        placements.len(),
        segments.len(),
        per_segment
    );

    Ok(Distribution {
        placements,
        per_segment,
        unplaced,
    })
}
