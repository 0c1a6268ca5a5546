// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard state polled by the on-screen keyboard.
//!
//! The audio thread applies each call's feedback buffer; the UI thread polls
//! per repaint. State is one atomic bit mask per [`FeedbackKind`], so neither
//! side ever waits on the other.

use std::sync::atomic::{AtomicU32, Ordering};

use super::mapper::DISPLAY_KEYS;
use super::{FeedbackBuffer, FeedbackEvent, FeedbackKind};
use crate::engine::ScaleState;

/// How the widget should draw a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHighlight {
    /// Not lit
    None,
    /// Pressed root of the sounding chord
    Root,
    /// Generated chord tone
    ChordTone,
    /// Pressed, but outside the active scale
    OutOfScale,
}

/// Lit keys of the display, per feedback kind
#[derive(Debug, Default)]
pub struct KeyboardState {
    masks: [AtomicU32; 3],
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every event of a feedback buffer in order
    pub fn apply(&self, feedback: &FeedbackBuffer) {
        for event in feedback {
            self.apply_event(event);
        }
    }

    /// Apply a single feedback event
    pub fn apply_event(&self, event: &FeedbackEvent) {
        if event.key >= DISPLAY_KEYS {
            return;
        }

        let bit = 1u32 << event.key;
        let mask = &self.masks[event.kind.index()];
        if event.on {
            mask.fetch_or(bit, Ordering::Release);
        } else {
            mask.fetch_and(!bit, Ordering::Release);
        }
    }

    /// Turn every key off
    pub fn reset(&self) {
        for mask in &self.masks {
            mask.store(0, Ordering::Release);
        }
    }

    /// Check whether a display key is lit for the given kind
    pub fn is_on(&self, kind: FeedbackKind, key: u8) -> bool {
        key < DISPLAY_KEYS && self.masks[kind.index()].load(Ordering::Acquire) & (1 << key) != 0
    }

    /// Display keys currently lit for the given kind, ascending
    pub fn active_keys(&self, kind: FeedbackKind) -> Vec<u8> {
        let mask = self.masks[kind.index()].load(Ordering::Acquire);
        (0..DISPLAY_KEYS).filter(|&key| mask & (1 << key) != 0).collect()
    }

    /// Check whether any key is lit
    pub fn any_on(&self) -> bool {
        self.masks
            .iter()
            .any(|mask| mask.load(Ordering::Acquire) != 0)
    }

    /// Classify a display key for painting.
    ///
    /// A lit root or out-of-scale marker on a key whose pitch class is not in
    /// the active scale paints as out-of-scale. The scale is only read.
    pub fn highlight(&self, key: u8, scale: &ScaleState) -> KeyHighlight {
        let out_of_scale = self.is_on(FeedbackKind::OutOfScale, key);
        let root = self.is_on(FeedbackKind::Root, key);

        if out_of_scale || (root && !scale.is_in_scale(key)) {
            KeyHighlight::OutOfScale
        } else if root {
            KeyHighlight::Root
        } else if self.is_on(FeedbackKind::ChordTone, key) {
            KeyHighlight::ChordTone
        } else {
            KeyHighlight::None
        }
    }

    /// Scale-degree label for a display key, e.g. "F#"
    pub fn label(&self, key: u8, scale: &ScaleState) -> Option<String> {
        scale.snapshot()?.degree_label(key)
    }
}
