// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by the path model, the handle controller, the
//! distributor and the coordinate transform.
//!
//! Variants fall into two groups. Structural errors (`MalformedCommand`,
//! `UnknownCommand`, `MissingInitialMove`, `MissingCoordinates`,
//! `MissingAnchor`, `StaleHandleReference`) are returned to the caller
//! because the in-memory model is no longer trustworthy. Best-effort
//! conditions (`DistributionMismatch`, `CapabilityMissing`,
//! `StructuralMismatch`) are constructed so they can be logged, and the
//! batch they occurred in carries on without the affected item.

use crate::model::{EntityId, PerformerId};
use crate::path::CommandKind;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, FormationError>;

/// Everything that can go wrong inside the formation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormationError {
    /// A command was given the wrong number of coordinate pairs
    #[error("{kind:?} command expects {expected} coordinate pair(s), got {found}")]
    MalformedCommand {
        kind: CommandKind,
        expected: usize,
        found: usize,
    },

    /// A path letter (or stray token) that the path model does not support
    #[error("unsupported path command '{0}'")]
    UnknownCommand(String),

    /// A non-empty path must begin with a Move command
    #[error("path must start with a Move command")]
    MissingInitialMove,

    /// Distribution was asked to place entities on a path with no segments
    #[error("path has no drawable segments")]
    EmptyPath,

    /// A command index outside the path (or the immutable first command)
    #[error("command index {index} cannot be edited in a path of {len} commands")]
    SegmentIndexOutOfRange { index: usize, len: usize },

    /// A handle reference outlived the path generation it was created for
    #[error("handle {index} of generation {generation} is stale (current generation {current})")]
    StaleHandleReference {
        generation: u64,
        index: usize,
        current: u64,
    },

    /// A performer graphic has no dot to anchor its coordinates on
    #[error("performer {0} has no resolvable anchor")]
    MissingAnchor(PerformerId),

    /// A performer has never been placed on the canvas
    #[error("performer {0} has no render coordinates")]
    MissingCoordinates(PerformerId),

    /// Rounding reconciliation could not match the entity count exactly
    #[error("distribution allocated {allocated} slots for {expected} entities")]
    DistributionMismatch { allocated: usize, expected: usize },

    /// A selected canvas object does not expose the identity capability
    #[error("selected canvas object is missing its identity")]
    CapabilityMissing,

    /// A canvas performer is bound to another performer's formation point
    #[error("performer {entity} is bound to a formation point of performer {bound}")]
    StructuralMismatch {
        entity: PerformerId,
        bound: PerformerId,
    },

    /// No performer with this id lives on the canvas
    #[error("unknown performer {0}")]
    UnknownPerformer(PerformerId),

    /// No segment group with this id lives on the canvas
    #[error("unknown segment group {0:?}")]
    UnknownGroup(EntityId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_command_message_names_counts() {
        let err = FormationError::MalformedCommand {
            kind: CommandKind::Cubic,
            expected: 3,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Cubic command expects 3 coordinate pair(s), got 2"
        );
    }

    #[test]
    fn stale_handle_message_includes_generations() {
        let err = FormationError::StaleHandleReference {
            generation: 1,
            index: 4,
            current: 2,
        };
        assert!(err.to_string().contains("generation 1"));
        assert!(err.to_string().contains("current generation 2"));
    }
}
