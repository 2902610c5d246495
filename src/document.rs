// Copyright 2025 the Formation Editor Authors
// SPDX-License-Identifier: Apache-2.0

//! Formation documents for the command line front end.
//!
//! A document is a small TOML file:
//!
//! ```toml
//! path = "M 0 0 Q 50 100 100 0"
//! performers = [1, 2, 3, 4, 5]
//!
//! [settings]
//! arclen_accuracy = 0.0001
//! ```

use crate::canvas::HeadlessHost;
use crate::editor::FormationEditor;
use crate::model::{FormationPoint, MemoryStore, PerformerId};
use crate::path::Path;
use crate::settings::FieldSettings;
use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FormationDocument {
    pub path: Path,
    pub performers: Vec<PerformerId>,
    #[serde(default)]
    pub settings: FieldSettings,
}

impl FormationDocument {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid formation document")
    }

    pub fn load(file: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("failed to load {}", file.display()))
    }

    /// Distribute the performers along the path, headless
    pub fn place(&self) -> anyhow::Result<Vec<FormationPoint>> {
        let mut editor = FormationEditor::new(self.settings.clone());
        let mut host = HeadlessHost::new();
        let mut store = MemoryStore::new();
        for performer in &self.performers {
            editor.add_performer(*performer, performer.to_string());
        }
        editor.create_segment_group(
            self.performers.clone(),
            self.path.clone(),
            &mut host,
            &mut store,
        )?;

        Ok(store
            .commits()
            .last()
            .map(|batch| batch.iter().copied().map(FormationPoint::from).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_places_performers_in_order() {
        let document = FormationDocument::from_toml_str(
            r#"
            path = "M 0 0 L 100 0"
            performers = [7, 8, 9]

            [settings]
            grid_stroke_width = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(document.settings.grid_stroke_width, 2.0);

        let points = document.place().unwrap();
        let order: Vec<u64> = points.iter().map(|p| p.performer.raw()).collect();
        assert_eq!(order, vec![7, 8, 9]);
        assert!((points[1].x - 50.0).abs() < 1e-6);
    }

    #[test]
    fn settings_table_is_optional() {
        let document =
            FormationDocument::from_toml_str("path = \"M 0 0 L 1 1\"\nperformers = []\n").unwrap();
        assert_eq!(document.settings, FieldSettings::default());
        assert!(document.place().unwrap().is_empty());
    }

    #[test]
    fn bad_path_is_reported() {
        let err = FormationDocument::from_toml_str("path = \"L 1 1\"\nperformers = [1]\n")
            .unwrap_err();
        assert!(format!("{err:#}").contains("Move"));
    }

    #[test]
    fn placements_serialize_as_plain_records() {
        let point = FormationPoint::new(PerformerId(3), 1.5, 2.0);
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"performer":3,"x":1.5,"y":2.0}"#);
    }
}
