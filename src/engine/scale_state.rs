// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale membership shared between the control thread and the audio thread.
//!
//! The state is a single `Copy` [`Scale`] snapshot behind a mutex. Writers
//! build the new snapshot before taking the lock, so both sides only hold it
//! for a copy or a bit test and nothing allocates while it is held.

use std::sync::Mutex;

use tracing::{debug, warn};

use crate::music::{MidiNote, NoteName, PitchClassSet, Scale, ScaleKind};

/// Thread-safe scale selection
#[derive(Debug, Default)]
pub struct ScaleState {
    current: Mutex<Option<Scale>>,
}

impl ScaleState {
    /// Create a state with no scale selected. Every note is out of scale
    /// until [`ScaleState::set_scale`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a scale. Called from the control thread.
    ///
    /// `root = None` disables scale filtering: every note counts as in
    /// scale and the published pitch classes are the unrotated row.
    pub fn set_scale(&self, root: Option<NoteName>, kind: ScaleKind) {
        let scale = Scale::new(root, kind);

        match self.current.lock() {
            Ok(mut current) => *current = Some(scale),
            Err(_) => {
                warn!("scale state lock poisoned, selection ignored");
                return;
            }
        }

        debug!(
            root = ?root.map(|r| r.to_string()),
            kind = %kind,
            pitch_classes = scale.pitch_classes().bits(),
            "scale selected"
        );
    }

    /// Check whether a MIDI note is in the active scale. Called from the
    /// audio thread; fails closed if no scale was ever set.
    #[inline]
    pub fn is_in_scale(&self, midi_note: MidiNote) -> bool {
        self.current
            .lock()
            .map(|current| current.map_or(false, |scale| scale.allows(midi_note)))
            .unwrap_or(false)
    }

    /// Copy of the current selection, if any
    pub fn snapshot(&self) -> Option<Scale> {
        self.current.lock().ok().and_then(|current| *current)
    }

    /// Active pitch classes (empty before the first selection)
    pub fn pitch_classes(&self) -> PitchClassSet {
        self.snapshot()
            .map(|scale| scale.pitch_classes())
            .unwrap_or(PitchClassSet::EMPTY)
    }
}
