// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Canvas objects and the rendering host they are drawn through

pub mod host;
pub mod performer;
pub mod scene;

pub use host::{HeadlessHost, SceneHost, SceneKey, SceneObject};
pub use performer::{GraphicPart, PerformerDot};
pub use scene::{ActiveSelection, CanvasRef, Scene};
