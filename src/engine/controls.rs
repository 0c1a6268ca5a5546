// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Selections the UI thread changes while the audio thread runs.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::ScaleState;
use crate::music::{ChordKind, NoteName, ScaleKind};

/// What to do with a note-on outside the active scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfScalePolicy {
    /// Generate nothing; only mark the key on the display
    #[default]
    Block,
    /// Build the chord on the nearest scale tone instead
    Snap,
}

impl OutOfScalePolicy {
    fn to_value(self) -> u8 {
        match self {
            OutOfScalePolicy::Block => 0,
            OutOfScalePolicy::Snap => 1,
        }
    }

    fn from_value(v: u8) -> Self {
        match v {
            1 => OutOfScalePolicy::Snap,
            _ => OutOfScalePolicy::Block,
        }
    }
}

/// Control handle shared (behind an `Arc`) by the UI and the engine.
///
/// Chord kind, filter toggle and policy are single atomics; the scale lives
/// in [`ScaleState`].
#[derive(Debug)]
pub struct Controls {
    scale: ScaleState,
    chord: AtomicU8,
    scale_filter: AtomicBool,
    out_of_scale: AtomicU8,
}

impl Controls {
    /// Create controls with no scale selected, a major triad chord, scale
    /// filtering on and the blocking out-of-scale policy
    pub fn new() -> Self {
        Self {
            scale: ScaleState::new(),
            chord: AtomicU8::new(ChordKind::default().to_value()),
            scale_filter: AtomicBool::new(true),
            out_of_scale: AtomicU8::new(OutOfScalePolicy::default().to_value()),
        }
    }

    /// Shared scale membership state
    pub fn scale(&self) -> &ScaleState {
        &self.scale
    }

    /// Select the scale (see [`ScaleState::set_scale`])
    pub fn set_scale(&self, root: Option<NoteName>, kind: ScaleKind) {
        self.scale.set_scale(root, kind);
    }

    /// Currently selected chord kind
    #[inline]
    pub fn chord(&self) -> ChordKind {
        ChordKind::from_value(self.chord.load(Ordering::Acquire))
    }

    /// Select the chord kind. `ChordKind::Invalid` disables generation.
    pub fn set_chord(&self, kind: ChordKind) {
        self.chord.store(kind.to_value(), Ordering::Release);
        info!(chord = %kind, "chord selected");
    }

    /// Whether notes are checked against the scale at all
    #[inline]
    pub fn scale_filter(&self) -> bool {
        self.scale_filter.load(Ordering::Acquire)
    }

    pub fn set_scale_filter(&self, enabled: bool) {
        self.scale_filter.store(enabled, Ordering::Release);
        info!(enabled, "scale filter toggled");
    }

    #[inline]
    pub fn out_of_scale_policy(&self) -> OutOfScalePolicy {
        OutOfScalePolicy::from_value(self.out_of_scale.load(Ordering::Acquire))
    }

    pub fn set_out_of_scale_policy(&self, policy: OutOfScalePolicy) {
        self.out_of_scale.store(policy.to_value(), Ordering::Release);
        info!(?policy, "out-of-scale policy changed");
    }

    /// Whether a note passes the scale check, honouring the filter toggle
    #[inline]
    pub fn accepts(&self, midi_note: u8) -> bool {
        !self.scale_filter() || self.scale.is_in_scale(midi_note)
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}
