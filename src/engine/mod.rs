// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Real-time side of the plugin: scale gating, the held chord and the
//! per-buffer transform.

pub mod controls;
pub mod scale_state;
pub mod transform;
pub mod voice;

pub use controls::{Controls, OutOfScalePolicy};
pub use scale_state::ScaleState;
pub use transform::MidiTransformEngine;
pub use voice::{ChordVoice, ChordVoiceTracker, NotePhase};
