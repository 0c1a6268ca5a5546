// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! UI feedback stream.
//!
//! The engine reports what the keyboard widget should light up as typed
//! [`FeedbackEvent`]s rather than performance MIDI. Each event names its
//! [`FeedbackKind`] so the widget can colour the pressed root, chord tones
//! and out-of-scale presses differently. Events can still be converted to
//! MIDI on a reserved notification channel for collaborators that only
//! understand MIDI.

pub mod keyboard;
pub mod mapper;

pub use keyboard::{KeyHighlight, KeyboardState};

use crate::midi::{EventBuffer, MidiEvent, MidiMessage};

/// What a feedback event marks on the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    /// The key the player pressed (chord root)
    Root,
    /// A generated chord tone
    ChordTone,
    /// A pressed key outside the active scale
    OutOfScale,
}

impl FeedbackKind {
    pub const ALL: [FeedbackKind; 3] = [
        FeedbackKind::Root,
        FeedbackKind::ChordTone,
        FeedbackKind::OutOfScale,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            FeedbackKind::Root => 0,
            FeedbackKind::ChordTone => 1,
            FeedbackKind::OutOfScale => 2,
        }
    }
}

/// One key lighting up or going dark on the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackEvent {
    /// Sample offset within the buffer the event belongs to
    pub sample_offset: u32,
    /// Timestamp carried with the event
    pub timestamp: f64,
    pub kind: FeedbackKind,
    /// Display key (0-24)
    pub key: u8,
    /// Velocity of the note-on, 0 for note-off
    pub velocity: u8,
    /// True for key down, false for key up
    pub on: bool,
}

impl FeedbackEvent {
    /// Event for an absolute pitch, folded onto the display by
    /// [`mapper::map`]. `offset` is the chord interval for chord tones.
    pub fn for_pitch(
        kind: FeedbackKind,
        pitch: u8,
        offset: u8,
        sample_offset: u32,
        timestamp: f64,
        velocity: u8,
    ) -> Self {
        let (key, _channel) = mapper::map(kind, pitch, offset);
        Self {
            sample_offset,
            timestamp,
            kind,
            key,
            velocity,
            on: velocity > 0,
        }
    }

    /// Convert to MIDI on the kind's notification channel
    pub fn to_midi(&self) -> MidiEvent {
        let channel = mapper::notification_channel(self.kind);
        let message = if self.on {
            MidiMessage::NoteOn {
                channel,
                note: self.key,
                velocity: self.velocity,
            }
        } else {
            MidiMessage::NoteOff {
                channel,
                note: self.key,
                velocity: 0,
            }
        };
        MidiEvent::new(self.sample_offset, self.timestamp, message)
    }

    /// Interpret a MIDI event on a notification channel as feedback
    pub fn from_midi(event: &MidiEvent) -> Option<Self> {
        let (channel, key, velocity, on) = match event.message {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => (channel, note, velocity, true),
            MidiMessage::NoteOff { channel, note, .. } => (channel, note, 0, false),
            _ => return None,
        };

        Some(Self {
            sample_offset: event.sample_offset,
            timestamp: event.timestamp,
            kind: mapper::kind_for_channel(channel)?,
            key,
            velocity,
            on,
        })
    }
}

/// Feedback events for one processing call
pub type FeedbackBuffer = EventBuffer<FeedbackEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_midi_conversion() {
        let event = FeedbackEvent {
            sample_offset: 32,
            timestamp: 1.5,
            kind: FeedbackKind::ChordTone,
            key: 16,
            velocity: 90,
            on: true,
        };

        let midi = event.to_midi();
        assert_eq!(midi.sample_offset, 32);
        assert_eq!(
            midi.message,
            MidiMessage::NoteOn {
                channel: mapper::CHORD_CHANNEL,
                note: 16,
                velocity: 90
            }
        );
        assert_eq!(FeedbackEvent::from_midi(&midi), Some(event));
    }

    #[test]
    fn test_for_pitch_folds_onto_display() {
        let tone = FeedbackEvent::for_pitch(FeedbackKind::ChordTone, 71, 7, 4, 0.5, 80);
        assert_eq!(tone.key, 5);
        assert!(tone.on);

        let root = FeedbackEvent::for_pitch(FeedbackKind::Root, 71, 7, 4, 0.5, 0);
        assert_eq!(root.key, 23);
        assert!(!root.on);
    }

    #[test]
    fn test_non_notification_channel_is_not_feedback() {
        let midi = MidiEvent::note_on(0, 0, 60, 100);
        assert_eq!(FeedbackEvent::from_midi(&midi), None);
    }
}
