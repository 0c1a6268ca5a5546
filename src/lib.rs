// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale-aware chord generation for a MIDI effect plugin.
//!
//! Every note the player presses is checked against a selected scale. Notes
//! in the scale become chords; notes outside it generate nothing and are
//! marked on the on-screen keyboard instead.
//!
//! - [`music`]: scale and chord tables, note spelling
//! - [`engine`]: shared controls, the held chord and the per-buffer transform
//! - [`feedback`]: display events and the keyboard model the UI polls
//! - [`midi`]: sample-positioned events and fixed-capacity buffers
//! - [`config`]: TOML settings with hot reload

pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod midi;
pub mod music;

pub use config::Settings;
pub use engine::{Controls, MidiTransformEngine, OutOfScalePolicy, ScaleState};
pub use error::{Error, Result};
pub use feedback::{FeedbackBuffer, FeedbackEvent, FeedbackKind, KeyboardState};
pub use midi::{MidiBuffer, MidiEvent, MidiMessage};
pub use music::{ChordKind, NoteName, Scale, ScaleKind};
