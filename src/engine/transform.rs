// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-buffer MIDI transform.
//!
//! Each call walks the host's events in order. A pressed note that passes the
//! scale check becomes a chord; a note outside the scale only lights its key
//! on the display. Only one chord sounds at a time: a new press releases the
//! held chord one sample before the new chord starts.
//!
//! Output goes into a scratch buffer that is swapped with the host's buffer
//! at the end of the call. The buffer swapped out is grown to the engine's
//! capacity on the next call, so processing only allocates while the host
//! keeps handing in buffers smaller than that.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::voice::{ChordVoiceTracker, NotePhase};
use super::{Controls, OutOfScalePolicy};
use crate::feedback::{FeedbackBuffer, FeedbackEvent, FeedbackKind, KeyboardState};
use crate::midi::{MidiBuffer, MidiEvent, MidiMessage, DEFAULT_BUFFER_CAPACITY};
use crate::music::MidiNote;

/// Converts incoming notes into chords plus keyboard feedback
#[derive(Debug)]
pub struct MidiTransformEngine {
    controls: Arc<Controls>,
    voice: ChordVoiceTracker,
    scratch: MidiBuffer,
    feedback: FeedbackBuffer,
    keyboard: Option<Arc<KeyboardState>>,
    capacity: usize,
    overflowing: bool,
}

impl MidiTransformEngine {
    /// Create an engine with the default buffer capacity
    pub fn new(controls: Arc<Controls>) -> Self {
        Self::with_capacity(controls, DEFAULT_BUFFER_CAPACITY)
    }

    /// Create an engine whose scratch and feedback buffers hold `capacity`
    /// events each
    pub fn with_capacity(controls: Arc<Controls>, capacity: usize) -> Self {
        debug!(capacity, "transform engine created");
        Self {
            controls,
            voice: ChordVoiceTracker::new(),
            scratch: MidiBuffer::with_capacity(capacity),
            feedback: FeedbackBuffer::with_capacity(capacity),
            keyboard: None,
            capacity,
            overflowing: false,
        }
    }

    /// Apply every call's feedback to a keyboard model
    pub fn with_keyboard(mut self, keyboard: Arc<KeyboardState>) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn controls(&self) -> &Arc<Controls> {
        &self.controls
    }

    /// The held chord, if any
    pub fn voice(&self) -> &ChordVoiceTracker {
        &self.voice
    }

    /// Whether a chord is currently held
    pub fn is_holding(&self) -> bool {
        self.voice.is_valid()
    }

    /// Events each output buffer holds per call
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the last call dropped events
    pub fn is_overflowing(&self) -> bool {
        self.overflowing
    }

    /// Feedback produced by the last call
    pub fn feedback(&self) -> &FeedbackBuffer {
        &self.feedback
    }

    /// Transform one buffer of host MIDI in place.
    ///
    /// On return `midi` holds the performance output and the returned buffer
    /// the display feedback for this call.
    pub fn process(&mut self, midi: &mut MidiBuffer) -> &FeedbackBuffer {
        self.scratch.clear();
        self.scratch.set_capacity(self.capacity);
        self.feedback.clear();

        for event in midi.iter() {
            match event.message {
                MidiMessage::NoteOn { note, velocity: 0, .. } => self.note_off(event, note),
                MidiMessage::NoteOn {
                    channel,
                    note,
                    velocity,
                } => self.note_on(event, channel, note, velocity),
                MidiMessage::NoteOff { note, .. } => self.note_off(event, note),
                _ => {
                    self.scratch.push(*event);
                }
            }
        }

        std::mem::swap(midi, &mut self.scratch);
        self.finish_call(midi.has_overflowed());
        &self.feedback
    }

    /// Release any held chord, e.g. when the host transport stops.
    ///
    /// Note-offs are appended to `midi` at sample 0.
    pub fn reset(&mut self, midi: &mut MidiBuffer, timestamp: f64) -> &FeedbackBuffer {
        self.feedback.clear();

        if self.voice.is_valid() {
            self.voice
                .generate_midi(NotePhase::Off, 0, timestamp, midi, &mut self.feedback);
            self.voice.reset();
            debug!("held chord released on reset");
        }

        self.finish_call(midi.has_overflowed());
        &self.feedback
    }

    fn note_on(&mut self, event: &MidiEvent, channel: u8, note: MidiNote, velocity: u8) {
        let position = event.sample_offset;
        let timestamp = event.timestamp;

        if let Some(held) = self.voice.voice() {
            let held_root = held.root;
            let release_at = position.saturating_sub(1);
            self.voice.generate_midi(
                NotePhase::Off,
                release_at,
                timestamp,
                &mut self.scratch,
                &mut self.feedback,
            );
            self.voice.reset();
            trace!(root = held_root, position = release_at, "chord released by new press");
        }

        let kind = self.controls.chord();

        if self.controls.accepts(note) {
            self.voice.setup(note, channel, kind, velocity, timestamp);
            self.voice.generate_midi(
                NotePhase::On,
                position,
                timestamp,
                &mut self.scratch,
                &mut self.feedback,
            );
            trace!(root = note, ?kind, position, "chord started");
            return;
        }

        self.feedback.push(FeedbackEvent::for_pitch(
            FeedbackKind::OutOfScale,
            note,
            0,
            position,
            timestamp,
            velocity,
        ));

        if self.controls.out_of_scale_policy() == OutOfScalePolicy::Snap {
            if let Some(scale) = self.controls.scale().snapshot() {
                let root = scale.quantize(note);
                if root != note && scale.contains_midi(root) {
                    self.voice
                        .setup_for_key(note, root, channel, kind, velocity, timestamp);
                    self.voice.generate_midi(
                        NotePhase::On,
                        position,
                        timestamp,
                        &mut self.scratch,
                        &mut self.feedback,
                    );
                    trace!(pressed = note, root, position, "snapped chord started");
                    return;
                }
            }
        }

        trace!(note, position, "out-of-scale press");
    }

    fn note_off(&mut self, event: &MidiEvent, note: MidiNote) {
        let position = event.sample_offset;
        let timestamp = event.timestamp;

        let held = self.voice.voice().filter(|held| held.trigger == note).copied();
        if let Some(held) = held {
            self.voice.generate_midi(
                NotePhase::Off,
                position,
                timestamp,
                &mut self.scratch,
                &mut self.feedback,
            );
            self.voice.reset();
            trace!(note, root = held.root, position, "chord released");
        }

        // A snapped voice lit its trigger as out of scale when it started
        let snapped = held.is_some_and(|held| held.is_snapped());
        if snapped || !self.controls.accepts(note) {
            self.feedback.push(FeedbackEvent::for_pitch(
                FeedbackKind::OutOfScale,
                note,
                0,
                position,
                timestamp,
                0,
            ));
        }
    }

    /// Warns once when calls start dropping events, not on every call
    fn finish_call(&mut self, midi_overflowed: bool) {
        if let Some(keyboard) = &self.keyboard {
            keyboard.apply(&self.feedback);
        }

        let feedback_overflowed = self.feedback.has_overflowed();
        let overflowed = midi_overflowed || feedback_overflowed;
        match (self.overflowing, overflowed) {
            (false, true) => warn!(
                midi_overflowed,
                feedback_overflowed,
                capacity = self.capacity,
                "event buffer full, events dropped"
            ),
            (true, true) => trace!(midi_overflowed, feedback_overflowed, "events dropped"),
            (true, false) => debug!("event buffers no longer overflowing"),
            (false, false) => {}
        }
        self.overflowing = overflowed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{ChordKind, NoteName, ScaleKind};

    fn c_major_engine() -> MidiTransformEngine {
        let controls = Arc::new(Controls::new());
        controls.set_scale(Some(NoteName::from_pitch_class(0)), ScaleKind::Major);
        controls.set_chord(ChordKind::MajorTriad);
        MidiTransformEngine::new(controls)
    }

    fn notes_on(midi: &MidiBuffer) -> Vec<(u32, u8)> {
        midi.iter()
            .filter_map(|e| match e.message {
                MidiMessage::NoteOn { note, .. } => Some((e.sample_offset, note)),
                _ => None,
            })
            .collect()
    }

    fn notes_off(midi: &MidiBuffer) -> Vec<(u32, u8)> {
        midi.iter()
            .filter_map(|e| match e.message {
                MidiMessage::NoteOff { note, .. } => Some((e.sample_offset, note)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_c_major_triad() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(0, 0, 60, 100)]);

        let feedback = engine.process(&mut midi);
        assert_eq!(feedback.len(), 4);

        assert_eq!(
            midi.as_slice(),
            &[
                MidiEvent::note_on(0, 0, 60, 100),
                MidiEvent::note_on(0, 0, 64, 100),
                MidiEvent::note_on(0, 0, 67, 100),
            ]
        );
        assert!(engine.is_holding());
    }

    #[test]
    fn test_press_and_release() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_off(64, 0, 60),
        ]);
        engine.process(&mut midi);

        assert_eq!(notes_on(&midi), vec![(0, 60), (0, 64), (0, 67)]);
        assert_eq!(notes_off(&midi), vec![(64, 60), (64, 64), (64, 67)]);
        assert!(!engine.is_holding());
    }

    #[test]
    fn test_new_press_releases_one_sample_early() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_on(100, 0, 64, 100),
        ]);
        engine.process(&mut midi);

        let events: Vec<(u32, bool, u8)> = midi
            .iter()
            .filter_map(|e| match e.message {
                MidiMessage::NoteOn { note, .. } => Some((e.sample_offset, true, note)),
                MidiMessage::NoteOff { note, .. } => Some((e.sample_offset, false, note)),
                _ => None,
            })
            .collect();

        assert_eq!(
            events,
            vec![
                (0, true, 60),
                (0, true, 64),
                (0, true, 67),
                (99, false, 60),
                (99, false, 64),
                (99, false, 67),
                (100, true, 64),
                (100, true, 67),
                (100, true, 71),
            ]
        );
        assert_eq!(engine.voice().voice().map(|v| v.root), Some(64));
    }

    #[test]
    fn test_release_position_saturates_at_zero() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_on(0, 0, 62, 100),
        ]);
        engine.process(&mut midi);
        assert!(notes_off(&midi).iter().all(|&(pos, _)| pos == 0));
    }

    #[test]
    fn test_out_of_scale_press_only_lights_key() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(0, 0, 61, 100)]);
        let feedback = engine.process(&mut midi).clone();

        assert!(midi.is_empty());
        assert_eq!(feedback.len(), 1);
        let event = feedback.as_slice()[0];
        assert_eq!(event.kind, FeedbackKind::OutOfScale);
        assert_eq!(event.key, 13);
        assert!(event.on);

        let mut midi = MidiBuffer::from_events([MidiEvent::note_off(10, 0, 61)]);
        let feedback = engine.process(&mut midi);
        assert_eq!(feedback.len(), 1);
        assert!(!feedback.as_slice()[0].on);
        assert!(midi.is_empty());
    }

    #[test]
    fn test_out_of_scale_press_still_releases_held_chord() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_on(50, 0, 61, 100),
        ]);
        engine.process(&mut midi);

        assert_eq!(notes_off(&midi), vec![(49, 60), (49, 64), (49, 67)]);
        assert!(!engine.is_holding());
    }

    #[test]
    fn test_stale_note_off_is_ignored() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_on(10, 0, 64, 100),
            MidiEvent::note_off(20, 0, 60),
        ]);
        engine.process(&mut midi);

        assert_eq!(notes_off(&midi).len(), 3);
        assert!(engine.is_holding());
    }

    #[test]
    fn test_invalid_chord_generates_nothing() {
        let mut engine = c_major_engine();
        engine.controls().set_chord(ChordKind::Invalid);

        let mut midi = MidiBuffer::from_events([
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_off(10, 0, 60),
        ]);
        let feedback = engine.process(&mut midi);
        assert!(feedback.is_empty());
        assert!(midi.is_empty());
    }

    #[test]
    fn test_no_scale_selected_blocks_everything() {
        let mut engine = MidiTransformEngine::new(Arc::new(Controls::new()));
        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(0, 0, 60, 100)]);
        engine.process(&mut midi);
        assert!(midi.is_empty());
        assert!(!engine.is_holding());
    }

    #[test]
    fn test_filter_disabled_accepts_chromatic_notes() {
        let mut engine = c_major_engine();
        engine.controls().set_scale_filter(false);

        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(0, 0, 61, 100)]);
        engine.process(&mut midi);
        assert_eq!(notes_on(&midi), vec![(0, 61), (0, 65), (0, 68)]);
    }

    #[test]
    fn test_non_note_events_pass_through() {
        let mut engine = c_major_engine();
        let cc = MidiEvent::new(
            5,
            0.0,
            MidiMessage::ControlChange {
                channel: 0,
                controller: 1,
                value: 64,
            },
        );
        let bend = MidiEvent::new(7, 0.0, MidiMessage::PitchBend { channel: 3, value: -512 });
        let mut midi = MidiBuffer::from_events([cc, bend]);

        engine.process(&mut midi);
        assert_eq!(midi.as_slice(), &[cc, bend]);
    }

    #[test]
    fn test_zero_velocity_note_on_releases() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_on(8, 0, 60, 0),
        ]);
        engine.process(&mut midi);
        assert_eq!(notes_off(&midi), vec![(8, 60), (8, 64), (8, 67)]);
        assert!(!engine.is_holding());
    }

    #[test]
    fn test_snap_builds_chord_on_nearest_scale_tone() {
        let mut engine = c_major_engine();
        engine
            .controls()
            .set_out_of_scale_policy(OutOfScalePolicy::Snap);

        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(0, 0, 61, 100)]);
        let feedback = engine.process(&mut midi).clone();

        assert_eq!(notes_on(&midi), vec![(0, 60), (0, 64), (0, 67)]);
        assert!(feedback
            .iter()
            .any(|e| e.kind == FeedbackKind::OutOfScale && e.key == 13 && e.on));

        let mut midi = MidiBuffer::from_events([MidiEvent::note_off(32, 0, 61)]);
        let feedback = engine.process(&mut midi);
        assert_eq!(notes_off(&midi), vec![(32, 60), (32, 64), (32, 67)]);
        assert!(feedback
            .iter()
            .any(|e| e.kind == FeedbackKind::OutOfScale && e.key == 13 && !e.on));
        assert!(!engine.is_holding());
    }

    #[test]
    fn test_reset_releases_held_chord() {
        let mut engine = c_major_engine();
        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(40, 0, 60, 100)]);
        engine.process(&mut midi);

        let mut out = MidiBuffer::new();
        engine.reset(&mut out, 1.0);
        assert_eq!(notes_off(&out), vec![(0, 60), (0, 64), (0, 67)]);
        assert!(!engine.is_holding());

        let mut out = MidiBuffer::new();
        engine.reset(&mut out, 2.0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_overflow_drops_events_and_flags_buffer() {
        let controls = Arc::new(Controls::new());
        controls.set_scale(None, ScaleKind::Major);
        let mut engine = MidiTransformEngine::with_capacity(controls, 2);

        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(0, 0, 60, 100)]);
        engine.process(&mut midi);
        assert_eq!(midi.len(), 2);
        assert!(midi.has_overflowed());
    }

    #[test]
    fn test_capacity_survives_small_host_buffers() {
        let controls = Arc::new(Controls::new());
        controls.set_scale(None, ScaleKind::Major);
        controls.set_chord(ChordKind::MajorSeventh);
        let mut engine = MidiTransformEngine::with_capacity(controls, 128);

        let host_buffer = || {
            let mut midi = MidiBuffer::with_capacity(16);
            for i in 0..8u8 {
                midi.push(MidiEvent::note_on(i as u32 * 10, 0, 48 + i, 100));
            }
            midi
        };

        // First call: 4 note-ons, then 7 handovers of 4 offs + 4 ons
        let mut midi = host_buffer();
        engine.process(&mut midi);
        assert_eq!(midi.len(), 60);
        assert!(!midi.has_overflowed());

        // Second call also releases the chord held over from the first
        let mut midi = host_buffer();
        engine.process(&mut midi);
        assert_eq!(midi.len(), 64);
        assert!(!midi.has_overflowed());
        assert_eq!(midi.capacity(), 128);
        assert!(!engine.is_overflowing());
    }

    #[test]
    fn test_overflow_state_clears_on_next_full_call() {
        let controls = Arc::new(Controls::new());
        controls.set_scale(None, ScaleKind::Major);
        let mut engine = MidiTransformEngine::with_capacity(controls, 4);

        for _ in 0..2 {
            let mut midi = MidiBuffer::from_events([
                MidiEvent::note_on(0, 0, 60, 100),
                MidiEvent::note_on(10, 0, 62, 100),
            ]);
            engine.process(&mut midi);
            assert!(engine.is_overflowing());
        }

        let mut midi = MidiBuffer::from_events([MidiEvent::note_off(0, 0, 62)]);
        engine.process(&mut midi);
        assert_eq!(notes_off(&midi).len(), 3);
        assert!(!engine.is_overflowing());
    }

    #[test]
    fn test_snapped_release_clears_marker_after_scale_change() {
        let keyboard = Arc::new(KeyboardState::new());
        let mut engine = c_major_engine().with_keyboard(Arc::clone(&keyboard));
        engine
            .controls()
            .set_out_of_scale_policy(OutOfScalePolicy::Snap);

        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(0, 0, 61, 100)]);
        engine.process(&mut midi);
        assert!(keyboard.is_on(FeedbackKind::OutOfScale, 13));

        // C# is in D major, so the released key is no longer out of scale
        engine
            .controls()
            .set_scale(Some(NoteName::from_pitch_class(2)), ScaleKind::Major);

        let mut midi = MidiBuffer::from_events([MidiEvent::note_off(16, 0, 61)]);
        engine.process(&mut midi);
        assert_eq!(notes_off(&midi), vec![(16, 60), (16, 64), (16, 67)]);
        assert!(!keyboard.any_on());
    }

    #[test]
    fn test_keyboard_tracks_held_chord() {
        let keyboard = Arc::new(KeyboardState::new());
        let mut engine = c_major_engine().with_keyboard(Arc::clone(&keyboard));

        let mut midi = MidiBuffer::from_events([MidiEvent::note_on(0, 0, 60, 100)]);
        engine.process(&mut midi);
        assert_eq!(keyboard.active_keys(FeedbackKind::ChordTone), vec![12, 16, 19]);
        assert_eq!(keyboard.active_keys(FeedbackKind::Root), vec![12]);

        let mut midi = MidiBuffer::from_events([MidiEvent::note_off(0, 0, 60)]);
        engine.process(&mut midi);
        assert!(!keyboard.any_on());
    }
}
