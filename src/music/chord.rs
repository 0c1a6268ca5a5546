// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Largest number of tones any chord kind produces
pub const CHORD_MAX_NOTES: usize = 4;

/// Chord kinds built on the pressed root note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordKind {
    #[default]
    MajorTriad,
    MinorTriad,
    MajorSeventh,
    MinorSeventh,
    /// Chord generation disabled
    Invalid,
}

impl ChordKind {
    /// Every selectable chord kind, in menu order
    pub const ALL: [ChordKind; 4] = [
        ChordKind::MajorTriad,
        ChordKind::MinorTriad,
        ChordKind::MajorSeventh,
        ChordKind::MinorSeventh,
    ];

    /// Chord tones as semitone offsets from the root, lowest first
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordKind::MajorTriad => &[0, 4, 7],
            ChordKind::MinorTriad => &[0, 3, 7],
            ChordKind::MajorSeventh => &[0, 4, 7, 11],
            ChordKind::MinorSeventh => &[0, 3, 7, 10],
            ChordKind::Invalid => &[],
        }
    }

    /// Get a human-readable name for this chord kind
    pub fn name(self) -> &'static str {
        match self {
            ChordKind::MajorTriad => "Major Triad",
            ChordKind::MinorTriad => "Minor Triad",
            ChordKind::MajorSeventh => "Major Seventh",
            ChordKind::MinorSeventh => "Minor Seventh",
            ChordKind::Invalid => "Invalid",
        }
    }

    /// Compact encoding used for atomic storage
    pub(crate) fn to_value(self) -> u8 {
        match self {
            ChordKind::Invalid => 0,
            ChordKind::MajorTriad => 1,
            ChordKind::MinorTriad => 2,
            ChordKind::MajorSeventh => 3,
            ChordKind::MinorSeventh => 4,
        }
    }

    pub(crate) fn from_value(v: u8) -> Self {
        match v {
            1 => ChordKind::MajorTriad,
            2 => ChordKind::MinorTriad,
            3 => ChordKind::MajorSeventh,
            4 => ChordKind::MinorSeventh,
            _ => ChordKind::Invalid,
        }
    }
}

impl fmt::Display for ChordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match key.as_str() {
            "majortriad" | "major" | "maj" => Ok(ChordKind::MajorTriad),
            "minortriad" | "minor" | "min" => Ok(ChordKind::MinorTriad),
            "majorseventh" | "maj7" => Ok(ChordKind::MajorSeventh),
            "minorseventh" | "min7" | "m7" => Ok(ChordKind::MinorSeventh),
            "invalid" | "none" | "off" => Ok(ChordKind::Invalid),
            _ => Err(Error::UnknownChord(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_intervals() {
        assert_eq!(ChordKind::MajorTriad.intervals(), &[0, 4, 7]);
        assert_eq!(ChordKind::MinorTriad.intervals(), &[0, 3, 7]);
        assert_eq!(ChordKind::MajorSeventh.intervals(), &[0, 4, 7, 11]);
        assert_eq!(ChordKind::MinorSeventh.intervals(), &[0, 3, 7, 10]);
        assert!(ChordKind::Invalid.intervals().is_empty());
    }

    #[test]
    fn test_no_chord_exceeds_max_notes() {
        for kind in ChordKind::ALL {
            assert!(kind.intervals().len() <= CHORD_MAX_NOTES);
        }
    }

    #[test]
    fn test_value_encoding() {
        for kind in ChordKind::ALL {
            assert_eq!(ChordKind::from_value(kind.to_value()), kind);
        }
        assert_eq!(ChordKind::from_value(200), ChordKind::Invalid);
    }

    #[test]
    fn test_chord_from_str() {
        assert_eq!("major_triad".parse::<ChordKind>().unwrap(), ChordKind::MajorTriad);
        assert_eq!("Minor Seventh".parse::<ChordKind>().unwrap(), ChordKind::MinorSeventh);
        assert_eq!("maj7".parse::<ChordKind>().unwrap(), ChordKind::MajorSeventh);
        assert!("sus4".parse::<ChordKind>().is_err());
    }

    #[test]
    fn test_chord_names() {
        assert_eq!(ChordKind::MajorSeventh.to_string(), "Major Seventh");
        assert_eq!(ChordKind::Invalid.name(), "Invalid");
    }
}
