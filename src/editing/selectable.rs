// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! The identity capability shared by everything that can be selected.
//!
//! Performer dots, control handles and formation lines all implement
//! `Selectable`, so selection code is written once against the trait.

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The class of a selectable canvas object
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ClassTag {
    Performer,
    CurvePoint,
    Curve,
}

impl ClassTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassTag::Performer => "performer",
            ClassTag::CurvePoint => "curve_point",
            ClassTag::Curve => "curve",
        }
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a canvas object is, as far as selection is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    pub class_tag: ClassTag,
    /// Id of the canvas object within its class
    pub numeric_id: u64,
    /// Id of the domain object that is selected externally
    pub external_id: u64,
}

impl Identity {
    pub fn new(class_tag: ClassTag, numeric_id: u64, external_id: u64) -> Self {
        Self {
            class_tag,
            numeric_id,
            external_id,
        }
    }

    /// `{class_tag}_{numeric_id}`; two objects are the same selection
    /// target exactly when these strings match
    pub fn class_id(&self) -> String {
        format!("{}_{}", self.class_tag, self.numeric_id)
    }
}

/// A canvas object that can take part in a selection
pub trait Selectable {
    /// The object's identity, or `None` when it was built without one
    fn identity(&self) -> Option<Identity>;

    /// Screen bounds in render coordinates
    fn bounds(&self) -> Rect;
}
