// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI primitives for the processing callback.
//!
//! Provides sample-accurate [`MidiEvent`]s and the fixed-capacity
//! [`MidiBuffer`] the engine reads from and writes into.

pub mod buffer;
pub mod message;

pub use buffer::{EventBuffer, DEFAULT_BUFFER_CAPACITY};
pub use message::MidiMessage;

/// Highest MIDI note number plus one
pub const MIDI_NOTE_RANGE: u16 = 128;

/// MIDI message constants
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const POLY_AFTERTOUCH: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_AFTERTOUCH: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;

    // System Real-Time Messages
    pub const TIMING_CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;
}

/// A MIDI message positioned within the current processing buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidiEvent {
    /// Sample offset within the buffer (0 = first sample)
    pub sample_offset: u32,
    /// Host timestamp carried alongside the message
    pub timestamp: f64,
    /// The message itself
    pub message: MidiMessage,
}

impl MidiEvent {
    /// Create a new event
    pub fn new(sample_offset: u32, timestamp: f64, message: MidiMessage) -> Self {
        Self {
            sample_offset,
            timestamp,
            message,
        }
    }

    /// Note On convenience constructor
    pub fn note_on(sample_offset: u32, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(
            sample_offset,
            0.0,
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            },
        )
    }

    /// Note Off convenience constructor
    pub fn note_off(sample_offset: u32, channel: u8, note: u8) -> Self {
        Self::new(
            sample_offset,
            0.0,
            MidiMessage::NoteOff {
                channel,
                note,
                velocity: 0,
            },
        )
    }

    /// Set the timestamp for this event
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Performance MIDI buffer handed to and from the host
pub type MidiBuffer = EventBuffer<MidiEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_message_constants() {
        assert_eq!(messages::NOTE_ON, 0x90);
        assert_eq!(messages::NOTE_OFF, 0x80);
        assert_eq!(messages::TIMING_CLOCK, 0xF8);
    }

    #[test]
    fn test_buffer_push_until_full() {
        let mut buffer = MidiBuffer::with_capacity(2);
        assert!(buffer.push(MidiEvent::note_on(0, 0, 60, 100)));
        assert!(buffer.push(MidiEvent::note_on(1, 0, 64, 100)));
        assert!(!buffer.has_overflowed());

        assert!(!buffer.push(MidiEvent::note_on(2, 0, 67, 100)));
        assert!(buffer.has_overflowed());
        assert_eq!(buffer.len(), 2);

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(!buffer.has_overflowed());
    }

    #[test]
    fn test_buffer_does_not_reallocate() {
        let mut buffer = MidiBuffer::with_capacity(8);
        let before = buffer.as_slice().as_ptr();
        for i in 0..16 {
            buffer.push(MidiEvent::note_on(i, 0, 60, 100));
        }
        assert_eq!(buffer.as_slice().as_ptr(), before);
        assert_eq!(buffer.len(), 8);
    }

    #[test]
    fn test_set_capacity_grows_storage() {
        let mut buffer = MidiBuffer::with_capacity(2);
        buffer.set_capacity(8);
        assert_eq!(buffer.capacity(), 8);

        let before = buffer.as_slice().as_ptr();
        for i in 0..8 {
            assert!(buffer.push(MidiEvent::note_on(i, 0, 60, 100)));
        }
        assert_eq!(buffer.as_slice().as_ptr(), before);
        assert!(!buffer.push(MidiEvent::note_on(8, 0, 60, 100)));
    }

    #[test]
    fn test_from_events_keeps_order() {
        let buffer = MidiBuffer::from_events([
            MidiEvent::note_on(0, 0, 60, 100),
            MidiEvent::note_off(10, 0, 60),
        ]);
        let offsets: Vec<u32> = buffer.iter().map(|e| e.sample_offset).collect();
        assert_eq!(offsets, vec![0, 10]);
        assert_eq!(buffer.capacity(), DEFAULT_BUFFER_CAPACITY);
    }
}
