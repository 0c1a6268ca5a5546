// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory tables for the chord engine.
//!
//! This module provides the scale and chord interval tables, note spelling,
//! and the scale-degree labels shown on the keyboard.

pub mod chord;
pub mod scale;

pub use chord::{ChordKind, CHORD_MAX_NOTES};
pub use scale::{
    Letter, MidiNote, NoteName, PitchClass, PitchClassSet, Scale, ScaleKind, OCTAVE_STEPS,
};
