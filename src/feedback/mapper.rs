// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Folding of generated pitches into the keyboard widget's display window.
//!
//! The widget shows two octaves plus one key (25 keys). Pressed and
//! out-of-scale keys fold with `mod 24`; chord tones are laid out from the
//! folded root and wrap with `mod 25` so a chord never leaves the window.

use super::FeedbackKind;

/// Keys spanned by the display (two octaves)
pub const DOUBLE_OCTAVE_STEPS: u8 = 24;

/// Number of keys drawn by the widget (two octaves plus the closing C)
pub const DISPLAY_KEYS: u8 = 25;

/// Notification channel (0-based) tagging the pressed root key
pub const ROOT_CHANNEL: u8 = 15;

/// Notification channel (0-based) tagging generated chord tones
pub const CHORD_CHANNEL: u8 = 14;

/// Notification channel (0-based) tagging out-of-scale presses
pub const OUT_OF_SCALE_CHANNEL: u8 = 13;

/// Fold a pressed note into the display window
#[inline]
pub fn fold_root(midi_note: u8) -> u8 {
    midi_note % DOUBLE_OCTAVE_STEPS
}

/// Fold a chord tone, laid out `offset` semitones above the folded root
#[inline]
pub fn fold_chord_tone(root: u8, offset: u8) -> u8 {
    (((root % DOUBLE_OCTAVE_STEPS) as u16 + offset as u16) % DISPLAY_KEYS as u16) as u8
}

/// Notification channel used when a feedback event travels as raw MIDI
#[inline]
pub fn notification_channel(kind: FeedbackKind) -> u8 {
    match kind {
        FeedbackKind::Root => ROOT_CHANNEL,
        FeedbackKind::ChordTone => CHORD_CHANNEL,
        FeedbackKind::OutOfScale => OUT_OF_SCALE_CHANNEL,
    }
}

/// Recover the feedback kind from a notification channel
#[inline]
pub fn kind_for_channel(channel: u8) -> Option<FeedbackKind> {
    match channel {
        ROOT_CHANNEL => Some(FeedbackKind::Root),
        CHORD_CHANNEL => Some(FeedbackKind::ChordTone),
        OUT_OF_SCALE_CHANNEL => Some(FeedbackKind::OutOfScale),
        _ => None,
    }
}

/// Map an absolute pitch of the given kind to `(display key, channel)`.
///
/// For chord tones `pitch` is the chord root and `offset` the chord
/// interval; other kinds ignore `offset`.
pub fn map(kind: FeedbackKind, pitch: u8, offset: u8) -> (u8, u8) {
    let key = match kind {
        FeedbackKind::ChordTone => fold_chord_tone(pitch, offset),
        FeedbackKind::Root | FeedbackKind::OutOfScale => fold_root(pitch),
    };
    (key, notification_channel(kind))
}
