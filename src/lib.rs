// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Formation Editor: performers spaced along editable curves
//!
//! The crate is the engine behind a drill-design canvas. A formation line
//! is an SVG-style path with draggable control handles; the performers
//! attached to it are spread evenly along it by arc length, drawn through
//! a coordinate transform that accounts for how the canvas positions its
//! graphics, and kept in step with the host application's selection.

pub mod animation;
pub mod canvas;
pub mod distribute;
pub mod document;
pub mod editing;
pub mod editor;
pub mod error;
pub mod model;
pub mod path;
pub mod settings;
pub mod transform;

pub use document::FormationDocument;
pub use editor::FormationEditor;
pub use error::{FormationError, Result};

/// Entry point for the `formation-editor` command line tool
pub fn run() -> anyhow::Result<()> {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var).
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("formation_editor=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(document_path) = args.get(1) else {
        tracing::error!("Usage: formation-editor <document.toml>");
        return Ok(());
    };

    let document_path = std::path::PathBuf::from(document_path);
    if !document_path.exists() {
        tracing::error!("Path does not exist: {}", document_path.display());
        tracing::error!("Usage: formation-editor <document.toml>");
        return Ok(());
    }

    tracing::info!("Loading formation from: {}", document_path.display());
    let document = FormationDocument::load(&document_path)?;
    let points = document.place()?;
    tracing::info!("Placed {} performers", points.len());
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}
