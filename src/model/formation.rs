// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Formation data exchanged with the outside world.
//!
//! The data layer owns `FormationPoint`s; the engine reads them once per
//! render cycle and answers with `PositionUpdate`s. When those updates are
//! committed (and how they are undone) is the store's business.

use super::PerformerId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// The persisted position of one performer on one page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationPoint {
    pub performer: PerformerId,
    pub x: f64,
    pub y: f64,
}

impl FormationPoint {
    pub fn new(performer: PerformerId, x: f64, y: f64) -> Self {
        Self { performer, x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One page of formation points, keyed by the performer graphic that
/// shows each point
pub type FormationPage = BTreeMap<PerformerId, FormationPoint>;

/// Key `points` by the performer each one names
pub fn page_of(points: impl IntoIterator<Item = FormationPoint>) -> FormationPage {
    points
        .into_iter()
        .map(|point| (point.performer, point))
        .collect()
}

/// A proposed new formation position for one performer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub performer: PerformerId,
    pub x: f64,
    pub y: f64,
}

impl From<PositionUpdate> for FormationPoint {
    fn from(update: PositionUpdate) -> Self {
        FormationPoint::new(update.performer, update.x, update.y)
    }
}

/// Persistence and history layer
///
/// Receives a batch of updates after every commit-worthy change and is
/// solely responsible for storing them and for undo/redo bookkeeping.
pub trait FormationStore {
    fn commit_positions(&mut self, updates: &[PositionUpdate]) -> anyhow::Result<()>;
}

/// A store that keeps every committed batch in memory.
///
/// Used by the command line front end and by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    commits: Vec<Vec<PositionUpdate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed batches, oldest first
    pub fn commits(&self) -> &[Vec<PositionUpdate>] {
        &self.commits
    }

    /// The most recently committed point of every performer
    pub fn latest(&self) -> FormationPage {
        page_of(self.commits.iter().flatten().map(|update| FormationPoint::from(*update)))
    }
}

impl FormationStore for MemoryStore {
    fn commit_positions(&mut self, updates: &[PositionUpdate]) -> anyhow::Result<()> {
        self.commits.push(updates.to_vec());
        Ok(())
    }
}

/// Where every performer should be at the end of a page transition
#[derive(Debug, Clone, PartialEq)]
pub struct PageTransition {
    pub duration: Duration,
    pub targets: Vec<FormationPoint>,
}

/// Page and tempo provider
pub trait PageTimeline {
    /// The transition into the page after the current one, if there is one
    fn next_page(&self) -> Option<PageTransition>;
}

/// Duration of a single beat at `tempo` beats per minute
pub fn tempo_to_duration(tempo: f64) -> Duration {
    if tempo <= 0.0 || !tempo.is_finite() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(60.0 / tempo)
}
