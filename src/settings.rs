// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Field settings and configuration constants.
//!
//! Compile-time defaults live in the constants below and are re-exported
//! through small public modules. `FieldSettings` carries the values that a
//! session may override (loaded from TOML) and is passed explicitly into
//! the transform, distribution and animation code.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// FIELD SETTINGS
// ============================================================================
/// Stroke width of the field grid lines (field units)
const GRID_STROKE_WIDTH: f64 = 1.0;

// ============================================================================
// PERFORMER GRAPHIC SETTINGS
// ============================================================================
/// Radius of a performer dot (field units)
const DOT_RADIUS: f64 = 5.0;

/// The label sits this many dot radii above the dot center
const LABEL_OFFSET_FACTOR: f64 = 2.2;

/// Label font size (field units)
const LABEL_FONT_SIZE: f64 = 14.0;

/// Advance of one label character, as a fraction of the font size.
/// Labels use a monospace face.
const LABEL_CHAR_ADVANCE: f64 = 0.6;

// ============================================================================
// MEASUREMENT SETTINGS
// ============================================================================
/// Arc length accuracy used when measuring segments (field units)
const ARCLEN_ACCURACY: f64 = 1e-3;

// ============================================================================
// ANIMATION SETTINGS
// ============================================================================
/// Delay after the last zoom event before render caching is turned back off
const ZOOM_CACHE_DELAY_MS: u64 = 50;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Field geometry
pub mod field {
    /// Stroke width of the field grid lines
    pub const GRID_STROKE_WIDTH: f64 = super::GRID_STROKE_WIDTH;
}

/// Performer dot and label geometry
pub mod performer {
    pub const DOT_RADIUS: f64 = super::DOT_RADIUS;
    pub const LABEL_OFFSET_FACTOR: f64 = super::LABEL_OFFSET_FACTOR;
    pub const LABEL_FONT_SIZE: f64 = super::LABEL_FONT_SIZE;
    pub const LABEL_CHAR_ADVANCE: f64 = super::LABEL_CHAR_ADVANCE;
}

/// Arc length measurement
pub mod measure {
    /// Accuracy passed to kurbo's arc length solver
    pub const ARCLEN_ACCURACY: f64 = super::ARCLEN_ACCURACY;
}

/// Transitions and render caching
pub mod animation {
    pub const ZOOM_CACHE_DELAY_MS: u64 = super::ZOOM_CACHE_DELAY_MS;
}

/// Settings for one editing session.
///
/// Every field falls back to its compile-time default, so a settings file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub grid_stroke_width: f64,
    pub dot_radius: f64,
    pub label_offset_factor: f64,
    pub label_font_size: f64,
    pub arclen_accuracy: f64,
    pub zoom_cache_delay_ms: u64,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            grid_stroke_width: field::GRID_STROKE_WIDTH,
            dot_radius: performer::DOT_RADIUS,
            label_offset_factor: performer::LABEL_OFFSET_FACTOR,
            label_font_size: performer::LABEL_FONT_SIZE,
            arclen_accuracy: measure::ARCLEN_ACCURACY,
            zoom_cache_delay_ms: animation::ZOOM_CACHE_DELAY_MS,
        }
    }
}

impl FieldSettings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid field settings")
    }

    /// Offset that centers a performer on a grid line
    pub fn grid_offset(&self) -> f64 {
        self.grid_stroke_width / 2.0
    }

    pub fn zoom_cache_delay(&self) -> Duration {
        Duration::from_millis(self.zoom_cache_delay_ms)
    }
}
