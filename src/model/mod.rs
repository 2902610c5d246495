// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Formation data model

pub mod entity_id;
pub mod formation;

pub use entity_id::{EntityId, PerformerId};
pub use formation::{
    FormationPage, FormationPoint, FormationStore, MemoryStore, PageTimeline, PageTransition,
    PositionUpdate, page_of, tempo_to_duration,
};
