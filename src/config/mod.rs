// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Settings file for the scale and chord selections.
//!
//! Settings are read from TOML. Every field has a default; leaving out
//! `scale.root` turns scale filtering off.
//!
//! ```toml
//! [scale]
//! root = "C"
//! kind = "major"
//!
//! [chord]
//! kind = "major_triad"
//!
//! [engine]
//! scale_filter = true
//! out_of_scale = "block"
//! buffer_capacity = 512
//! ```

pub mod watcher;

pub use watcher::{validate_config, ConfigEvent, ConfigWatcher};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{Controls, MidiTransformEngine, OutOfScalePolicy};
use crate::error::{Error, Result};
use crate::midi::DEFAULT_BUFFER_CAPACITY;
use crate::music::{ChordKind, NoteName, ScaleKind};

/// Smallest buffer that fits one chord release plus one chord start
pub const MIN_BUFFER_CAPACITY: usize = 16;

/// Largest accepted buffer capacity
pub const MAX_BUFFER_CAPACITY: usize = 65_536;

/// Root settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub scale: ScaleSettings,
    #[serde(default)]
    pub chord: ChordSettings,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&contents)?;
        info!(?path, "settings loaded");
        Ok(settings)
    }

    /// Parse and validate settings from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(toml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check values serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        let capacity = self.engine.buffer_capacity;
        if !(MIN_BUFFER_CAPACITY..=MAX_BUFFER_CAPACITY).contains(&capacity) {
            return Err(Error::InvalidSetting {
                field: "engine.buffer_capacity",
                reason: format!(
                    "{} is outside {}..={}",
                    capacity, MIN_BUFFER_CAPACITY, MAX_BUFFER_CAPACITY
                ),
            });
        }
        Ok(())
    }

    /// Push the selections into a shared control handle
    pub fn apply(&self, controls: &Controls) {
        controls.set_scale(self.scale.root, self.scale.kind);
        controls.set_chord(self.chord.kind);
        controls.set_scale_filter(self.engine.scale_filter);
        controls.set_out_of_scale_policy(self.engine.out_of_scale);
        info!(
            scale = %self.scale.describe(),
            chord = %self.chord.kind,
            "settings applied"
        );
    }

    /// Build an engine sized by these settings. Selections are not applied.
    pub fn build_engine(&self, controls: Arc<Controls>) -> MidiTransformEngine {
        MidiTransformEngine::with_capacity(controls, self.engine.buffer_capacity)
    }
}

/// `[scale]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScaleSettings {
    /// Root note name; leave out to disable scale filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<NoteName>,
    #[serde(default)]
    pub kind: ScaleKind,
}

impl ScaleSettings {
    fn describe(&self) -> String {
        match self.root {
            Some(root) => format!("{} {}", root, self.kind),
            None => format!("{} (unfiltered)", self.kind),
        }
    }
}

/// `[chord]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChordSettings {
    #[serde(default)]
    pub kind: ChordKind,
}

/// `[engine]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    /// Check pressed notes against the scale
    #[serde(default = "default_scale_filter")]
    pub scale_filter: bool,
    #[serde(default)]
    pub out_of_scale: OutOfScalePolicy,
    /// Events each engine buffer holds per call
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

fn default_scale_filter() -> bool {
    true
}
fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            scale_filter: default_scale_filter(),
            out_of_scale: OutOfScalePolicy::default(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml = r#"
[scale]
root = "Bb"
kind = "harmonic_minor"

[chord]
kind = "minor_seventh"

[engine]
scale_filter = false
out_of_scale = "snap"
buffer_capacity = 256
"#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.scale.root, Some("Bb".parse().unwrap()));
        assert_eq!(settings.scale.kind, ScaleKind::HarmonicMinor);
        assert_eq!(settings.chord.kind, ChordKind::MinorSeventh);
        assert!(!settings.engine.scale_filter);
        assert_eq!(settings.engine.out_of_scale, OutOfScalePolicy::Snap);
        assert_eq!(settings.engine.buffer_capacity, 256);
    }

    #[test]
    fn test_default_values() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.scale.root, None);
        assert_eq!(settings.scale.kind, ScaleKind::Major);
        assert_eq!(settings.chord.kind, ChordKind::MajorTriad);
        assert!(settings.engine.scale_filter);
        assert_eq!(settings.engine.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn test_round_trip() {
        let original = Settings {
            scale: ScaleSettings {
                root: Some("F#".parse().unwrap()),
                kind: ScaleKind::MelodicMinor,
            },
            chord: ChordSettings {
                kind: ChordKind::MajorSeventh,
            },
            engine: EngineSettings {
                scale_filter: true,
                out_of_scale: OutOfScalePolicy::Snap,
                buffer_capacity: 1024,
            },
        };

        let toml = original.to_toml().unwrap();
        let parsed = Settings::from_toml(&toml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        assert!(matches!(
            Settings::from_toml("[scale]\nkind = \"dorian\"\n"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Settings::from_toml("[scale]\nroot = \"H\"\n"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            Settings::from_toml("[chord]\nkind = \"sus4\"\n"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_buffer_capacity_bounds() {
        let result = Settings::from_toml("[engine]\nbuffer_capacity = 4\n");
        assert!(matches!(
            result,
            Err(Error::InvalidSetting {
                field: "engine.buffer_capacity",
                ..
            })
        ));
    }

    #[test]
    fn test_apply_updates_controls() {
        let settings = Settings::from_toml(
            "[scale]\nroot = \"D\"\nkind = \"major\"\n[chord]\nkind = \"minor_triad\"\n",
        )
        .unwrap();
        let controls = Controls::new();
        settings.apply(&controls);

        assert_eq!(controls.chord(), ChordKind::MinorTriad);
        assert!(controls.accepts(66));
        assert!(!controls.accepts(65));
    }

    #[test]
    fn test_missing_root_disables_filter() {
        let settings = Settings::from_toml("[scale]\nkind = \"natural_minor\"\n").unwrap();
        let controls = Controls::new();
        settings.apply(&controls);
        assert!((0..128).all(|note| controls.accepts(note)));

        let toml = settings.to_toml().unwrap();
        assert!(!toml.contains("root"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Settings::load("/nonexistent/settings.toml");
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
