// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model and interaction

pub mod control_points;
pub mod segment_group;
pub mod selectable;
pub mod selection;
pub mod sync;

pub use control_points::{ControlHandle, ControlPointController, HandleRef};
pub use segment_group::{MoveOffset, SegmentGroup};
pub use selectable::{ClassTag, Identity, Selectable};
pub use selection::SelectionSet;
pub use sync::{ExternalSelection, SelectionCanvas, SelectionSynchronizer, SyncState};
