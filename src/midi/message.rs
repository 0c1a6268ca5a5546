// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Parsed MIDI messages.
//!
//! Messages are `Copy` and never own heap data so they can be moved through
//! the audio callback freely.

use super::messages;

/// Parsed MIDI message types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiMessage {
    /// Note On: channel (0-15), note (0-127), velocity (1-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Control Change: channel (0-15), controller (0-127), value (0-127)
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Program Change: channel (0-15), program (0-127)
    ProgramChange { channel: u8, program: u8 },
    /// Pitch Bend: channel (0-15), value (-8192 to 8191)
    PitchBend { channel: u8, value: i16 },
    /// Channel Aftertouch: channel (0-15), pressure (0-127)
    ChannelAftertouch { channel: u8, pressure: u8 },
    /// Poly Aftertouch: channel (0-15), note (0-127), pressure (0-127)
    PolyAftertouch { channel: u8, note: u8, pressure: u8 },
    /// MIDI Clock tick
    TimingClock,
    /// Start playback
    Start,
    /// Continue playback
    Continue,
    /// Stop playback
    Stop,
    /// Anything else, kept as raw bytes for pass-through
    Other { bytes: [u8; 3], len: u8 },
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a MidiMessage
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        let status = data[0];

        // System Real-Time messages (single byte)
        match status {
            messages::TIMING_CLOCK => return Some(MidiMessage::TimingClock),
            messages::START => return Some(MidiMessage::Start),
            messages::CONTINUE => return Some(MidiMessage::Continue),
            messages::STOP => return Some(MidiMessage::Stop),
            _ => {}
        }

        // Channel messages
        let msg_type = status & 0xF0;
        let channel = status & 0x0F;

        match msg_type {
            messages::NOTE_OFF if data.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            messages::NOTE_ON if data.len() >= 3 => {
                let velocity = data[2] & 0x7F;
                // Note On with velocity 0 is equivalent to Note Off
                if velocity == 0 {
                    Some(MidiMessage::NoteOff {
                        channel,
                        note: data[1] & 0x7F,
                        velocity: 0,
                    })
                } else {
                    Some(MidiMessage::NoteOn {
                        channel,
                        note: data[1] & 0x7F,
                        velocity,
                    })
                }
            }
            messages::CONTROL_CHANGE if data.len() >= 3 => Some(MidiMessage::ControlChange {
                channel,
                controller: data[1] & 0x7F,
                value: data[2] & 0x7F,
            }),
            messages::PROGRAM_CHANGE if data.len() >= 2 => Some(MidiMessage::ProgramChange {
                channel,
                program: data[1] & 0x7F,
            }),
            messages::PITCH_BEND if data.len() >= 3 => {
                let lsb = (data[1] & 0x7F) as i16;
                let msb = (data[2] & 0x7F) as i16;
                let value = ((msb << 7) | lsb) - 8192;
                Some(MidiMessage::PitchBend { channel, value })
            }
            messages::CHANNEL_AFTERTOUCH if data.len() >= 2 => {
                Some(MidiMessage::ChannelAftertouch {
                    channel,
                    pressure: data[1] & 0x7F,
                })
            }
            messages::POLY_AFTERTOUCH if data.len() >= 3 => Some(MidiMessage::PolyAftertouch {
                channel,
                note: data[1] & 0x7F,
                pressure: data[2] & 0x7F,
            }),
            _ => {
                let len = data.len().min(3);
                let mut bytes = [0u8; 3];
                bytes[..len].copy_from_slice(&data[..len]);
                Some(MidiMessage::Other {
                    bytes,
                    len: len as u8,
                })
            }
        }
    }

    /// Encode back to raw bytes. Returns the byte array and its used length.
    pub fn to_bytes(&self) -> ([u8; 3], usize) {
        match *self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => ([messages::NOTE_ON | (channel & 0x0F), note, velocity], 3),
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => ([messages::NOTE_OFF | (channel & 0x0F), note, velocity], 3),
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => (
                [messages::CONTROL_CHANGE | (channel & 0x0F), controller, value],
                3,
            ),
            MidiMessage::ProgramChange { channel, program } => (
                [messages::PROGRAM_CHANGE | (channel & 0x0F), program, 0],
                2,
            ),
            MidiMessage::PitchBend { channel, value } => {
                let raw = (value + 8192).clamp(0, 0x3FFF) as u16;
                (
                    [
                        messages::PITCH_BEND | (channel & 0x0F),
                        (raw & 0x7F) as u8,
                        (raw >> 7) as u8,
                    ],
                    3,
                )
            }
            MidiMessage::ChannelAftertouch { channel, pressure } => (
                [messages::CHANNEL_AFTERTOUCH | (channel & 0x0F), pressure, 0],
                2,
            ),
            MidiMessage::PolyAftertouch {
                channel,
                note,
                pressure,
            } => (
                [messages::POLY_AFTERTOUCH | (channel & 0x0F), note, pressure],
                3,
            ),
            MidiMessage::TimingClock => ([messages::TIMING_CLOCK, 0, 0], 1),
            MidiMessage::Start => ([messages::START, 0, 0], 1),
            MidiMessage::Continue => ([messages::CONTINUE, 0, 0], 1),
            MidiMessage::Stop => ([messages::STOP, 0, 0], 1),
            MidiMessage::Other { bytes, len } => (bytes, len as usize),
        }
    }

    /// Note number and channel if this is a note on/off
    pub fn note(&self) -> Option<(u8, u8)> {
        match *self {
            MidiMessage::NoteOn { channel, note, .. } | MidiMessage::NoteOff { channel, note, .. } => {
                Some((channel, note))
            }
            _ => None,
        }
    }
}
