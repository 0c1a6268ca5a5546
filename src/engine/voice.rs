// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The chord currently sounding for a pressed root note.

use crate::feedback::{FeedbackBuffer, FeedbackEvent, FeedbackKind};
use crate::midi::{MidiBuffer, MidiEvent, MidiMessage, MIDI_NOTE_RANGE};
use crate::music::{ChordKind, MidiNote};

/// Which half of a chord's note pairs to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePhase {
    On,
    Off,
}

/// One held chord
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordVoice {
    /// Key the player pressed; its note-off releases the voice
    pub trigger: MidiNote,
    /// Root the chord is built on (differs from `trigger` when snapped)
    pub root: MidiNote,
    pub channel: u8,
    pub velocity: u8,
    /// Timestamp of the note-on that started the voice
    pub timestamp: f64,
    pub kind: ChordKind,
}

impl ChordVoice {
    /// Semitone offsets of the chord tones, in table order
    pub fn offsets(&self) -> &'static [u8] {
        self.kind.intervals()
    }

    /// Performance pitches of the chord, wrapping at the top of the MIDI range
    pub fn pitches(&self) -> impl Iterator<Item = MidiNote> + '_ {
        let root = self.root;
        self.offsets()
            .iter()
            .map(move |&offset| ((root as u16 + offset as u16) % MIDI_NOTE_RANGE) as MidiNote)
    }

    /// Whether this voice was built on a different note than was pressed
    pub fn is_snapped(&self) -> bool {
        self.trigger != self.root
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum VoiceState {
    #[default]
    Idle,
    Holding(ChordVoice),
}

/// Tracks the single chord voice the engine may hold.
///
/// A voice is only ever stored when it is valid, so `is_valid` is the same
/// as "holding".
#[derive(Debug, Default)]
pub struct ChordVoiceTracker {
    state: VoiceState,
}

impl ChordVoiceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a voice is held
    pub fn is_valid(&self) -> bool {
        matches!(self.state, VoiceState::Holding(_))
    }

    /// The held voice, if any
    pub fn voice(&self) -> Option<&ChordVoice> {
        match &self.state {
            VoiceState::Holding(voice) => Some(voice),
            VoiceState::Idle => None,
        }
    }

    /// Forget the held voice without emitting anything
    pub fn reset(&mut self) {
        self.state = VoiceState::Idle;
    }

    /// Start a voice for a pressed root. Emits nothing.
    ///
    /// The tracker stays idle when the root is 0, the channel is outside
    /// 0-15 or the chord kind has no tones.
    pub fn setup(&mut self, root: MidiNote, channel: u8, kind: ChordKind, velocity: u8, timestamp: f64) {
        self.setup_for_key(root, root, channel, kind, velocity, timestamp);
    }

    /// Like [`ChordVoiceTracker::setup`], but released by `trigger` instead
    /// of by the root
    pub fn setup_for_key(
        &mut self,
        trigger: MidiNote,
        root: MidiNote,
        channel: u8,
        kind: ChordKind,
        velocity: u8,
        timestamp: f64,
    ) {
        let valid = root > 0 && root < 128 && channel < 16 && !kind.intervals().is_empty();

        self.state = if valid {
            VoiceState::Holding(ChordVoice {
                trigger,
                root,
                channel,
                velocity,
                timestamp,
                kind,
            })
        } else {
            VoiceState::Idle
        };
    }

    /// Emit the held chord's note-ons or note-offs.
    ///
    /// Performance events go to `perf` on the voice's channel; display events
    /// go to `ui`, chord tones first and the root marker last. Does nothing
    /// when no voice is held.
    pub fn generate_midi(
        &self,
        phase: NotePhase,
        sample_position: u32,
        current_timestamp: f64,
        perf: &mut MidiBuffer,
        ui: &mut FeedbackBuffer,
    ) {
        let VoiceState::Holding(voice) = &self.state else {
            return;
        };

        let (on, velocity, ui_timestamp) = match phase {
            NotePhase::On => (true, voice.velocity, voice.timestamp),
            NotePhase::Off => (false, 0, current_timestamp),
        };

        for (&offset, note) in voice.offsets().iter().zip(voice.pitches()) {
            let message = if on {
                MidiMessage::NoteOn {
                    channel: voice.channel,
                    note,
                    velocity,
                }
            } else {
                MidiMessage::NoteOff {
                    channel: voice.channel,
                    note,
                    velocity: 0,
                }
            };
            perf.push(MidiEvent::new(sample_position, current_timestamp, message));

            ui.push(FeedbackEvent::for_pitch(
                FeedbackKind::ChordTone,
                voice.root,
                offset,
                sample_position,
                ui_timestamp,
                velocity,
            ));
        }

        ui.push(FeedbackEvent::for_pitch(
            FeedbackKind::Root,
            voice.root,
            0,
            sample_position,
            ui_timestamp,
            velocity,
        ));
    }
}
