// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the control path.
//!
//! The real-time path never returns errors; everything here comes from
//! parsing names, reading settings files or starting the file watcher.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised outside the audio callback
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown note name: {0:?}")]
    UnknownNote(String),

    #[error("unknown scale kind: {0:?}")]
    UnknownScale(String),

    #[error("unknown chord kind: {0:?}")]
    UnknownChord(String),

    #[error("failed to read settings file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("file watcher error")]
    Watch(#[from] notify::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
