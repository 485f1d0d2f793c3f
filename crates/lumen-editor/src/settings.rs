// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tunables for the inspector, loaded from an `Inspector.toml` file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Inspector configuration.
///
/// Stored in the [`TypedContext`](lumen_core::TypedContext) as a service.
/// Inspectors that find no settings in the context use [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorSettings {
    /// Whether unregistered types are expanded field by field. When false
    /// they render as a single line with their type name.
    pub fallback_enabled: bool,
    /// Nesting depth past which the fallback stops expanding.
    pub max_depth: usize,
    /// Drag speed for numeric fields without a `max`.
    pub drag_speed: f64,
    /// Whether statically submitted inspectors may replace each other.
    pub allow_override: bool,
}

impl Default for InspectorSettings {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            max_depth: 8,
            drag_speed: 1.0,
            allow_override: false,
        }
    }
}

impl InspectorSettings {
    /// Loads settings from `path`.
    /// If the file does not exist, it returns the default settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "No '{}' found. Using default inspector settings.",
                path.display()
            );
            return Ok(Self::default());
        }

        log::info!("Loading inspector settings from '{}'.", path.display());
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file at '{}'", path.display()))?;
        Self::from_toml_str(&source)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))
    }

    /// Parses settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = InspectorSettings::load(&dir.path().join("Inspector.toml")).unwrap();
        assert_eq!(settings, InspectorSettings::default());
    }

    #[test]
    fn test_file_overrides_only_given_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 3").unwrap();
        writeln!(file, "allow_override = true").unwrap();

        let settings = InspectorSettings::load(file.path()).unwrap();
        assert_eq!(settings.max_depth, 3);
        assert!(settings.allow_override);
        assert!(settings.fallback_enabled);
        assert_eq!(settings.drag_speed, 1.0);
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = \"deep\"").unwrap();

        let err = InspectorSettings::load(file.path()).unwrap_err();
        assert!(format!("{err}").contains("Failed to parse TOML"));
    }

    #[test]
    fn test_settings_survive_a_toml_round_trip() {
        let settings = InspectorSettings {
            fallback_enabled: false,
            max_depth: 2,
            drag_speed: 0.25,
            allow_override: true,
        };
        let text = toml::to_string(&settings).unwrap();
        assert_eq!(InspectorSettings::from_toml_str(&text).unwrap(), settings);
    }
}
