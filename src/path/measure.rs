// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Arc length measurement of path segments.
//!
//! The distributor only needs two questions answered: how long is this
//! segment, and where is the point a given distance along it. Hosts that
//! already own a path engine can answer these themselves; `KurboMeasure`
//! answers them with kurbo's arc length solver.

use super::segment::SubPath;
use crate::settings;
use kurbo::{ParamCurve, ParamCurveArclen, Point};

/// Length queries on a single segment
pub trait PathMeasure {
    /// Total arc length of `segment`
    fn measure_length(&self, segment: &SubPath) -> f64;

    /// The point `length` along `segment`, measured from its start
    fn point_at_length(&self, segment: &SubPath, length: f64) -> Point;
}

/// Arc length measurement using kurbo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KurboMeasure {
    /// Accuracy passed to kurbo's arc length routines, in path units
    pub accuracy: f64,
}

impl KurboMeasure {
    pub fn new(accuracy: f64) -> Self {
        Self { accuracy }
    }
}

impl Default for KurboMeasure {
    fn default() -> Self {
        Self::new(settings::measure::ARCLEN_ACCURACY)
    }
}

impl PathMeasure for KurboMeasure {
    fn measure_length(&self, segment: &SubPath) -> f64 {
        segment.to_seg().arclen(self.accuracy)
    }

    fn point_at_length(&self, segment: &SubPath, length: f64) -> Point {
        let seg = segment.to_seg();
        let total = seg.arclen(self.accuracy);
        if total <= f64::EPSILON || length <= 0.0 {
            return seg.start();
        }
        if length >= total {
            return seg.end();
        }
        let t = seg.inv_arclen(length, self.accuracy);
        seg.eval(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;

    fn first_segment(text: &str) -> SubPath {
        Path::parse(text).unwrap().split_into_segments()[0]
    }

    #[test]
    fn line_length_and_midpoint() {
        let measure = KurboMeasure::default();
        let seg = first_segment("M 0 0 L 30 40");
        assert!((measure.measure_length(&seg) - 50.0).abs() < 1e-9);
        let mid = measure.point_at_length(&seg, 25.0);
        assert!((mid.x - 15.0).abs() < 1e-6);
        assert!((mid.y - 20.0).abs() < 1e-6);
    }

    #[test]
    fn curve_is_longer_than_its_chord() {
        let measure = KurboMeasure::default();
        let seg = first_segment("M 0 0 Q 50 100 100 0");
        assert!(measure.measure_length(&seg) > 100.0);
    }

    #[test]
    fn lengths_outside_the_segment_clamp_to_its_ends() {
        let measure = KurboMeasure::default();
        let seg = first_segment("M 0 0 Q 50 100 100 0");
        assert_eq!(measure.point_at_length(&seg, -5.0), Point::new(0.0, 0.0));
        assert_eq!(measure.point_at_length(&seg, 1e6), Point::new(100.0, 0.0));
    }

    #[test]
    fn degenerate_segment_stays_on_its_start() {
        let measure = KurboMeasure::default();
        let seg = first_segment("M 5 5 L 5 5");
        assert_eq!(measure.measure_length(&seg), 0.0);
        assert_eq!(measure.point_at_length(&seg, 3.0), Point::new(5.0, 5.0));
    }
}
