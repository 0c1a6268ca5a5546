// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale table, note spelling and scale-degree labelling.
//!
//! Scales are stored as a 12-bit pitch-class mask so that a scale value is
//! `Copy`, fixed-size and cheap to compare from the real-time thread.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Pitch class (0-11)
pub type PitchClass = u8;

/// Semitones in one octave
pub const OCTAVE_STEPS: u8 = 12;

/// Natural note letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// All letters in ascending order from C
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Position of this letter counted from C (0-6)
    pub fn index(self) -> usize {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }

    /// Get the pitch class of the unaltered letter
    pub fn natural_pitch_class(self) -> PitchClass {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// Step forward through the letters, wrapping after B
    pub fn step(self, steps: usize) -> Self {
        Letter::ALL[(self.index() + steps) % Letter::ALL.len()]
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Letter::C => "C",
            Letter::D => "D",
            Letter::E => "E",
            Letter::F => "F",
            Letter::G => "G",
            Letter::A => "A",
            Letter::B => "B",
        };
        f.write_str(s)
    }
}

/// A spelled note name: letter plus accidental (-2 = bb .. +2 = ##)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteName {
    letter: Letter,
    accidental: i8,
}

impl NoteName {
    /// Sharp spellings used when only a pitch class is known
    const SHARP_SPELLINGS: [(Letter, i8); 12] = [
        (Letter::C, 0),
        (Letter::C, 1),
        (Letter::D, 0),
        (Letter::D, 1),
        (Letter::E, 0),
        (Letter::F, 0),
        (Letter::F, 1),
        (Letter::G, 0),
        (Letter::G, 1),
        (Letter::A, 0),
        (Letter::A, 1),
        (Letter::B, 0),
    ];

    /// Create a note name. Accidentals are clamped to double flat/sharp.
    pub fn new(letter: Letter, accidental: i8) -> Self {
        Self {
            letter,
            accidental: accidental.clamp(-2, 2),
        }
    }

    /// Natural note name for a letter
    pub fn natural(letter: Letter) -> Self {
        Self::new(letter, 0)
    }

    /// Default (sharp) spelling of a pitch class
    pub fn from_pitch_class(pc: PitchClass) -> Self {
        let (letter, accidental) = Self::SHARP_SPELLINGS[(pc % OCTAVE_STEPS) as usize];
        Self { letter, accidental }
    }

    pub fn letter(self) -> Letter {
        self.letter
    }

    pub fn accidental(self) -> i8 {
        self.accidental
    }

    /// Get the pitch class (0-11) for this note name
    pub fn pitch_class(self) -> PitchClass {
        (self.letter.natural_pitch_class() as i8 + self.accidental).rem_euclid(12) as PitchClass
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, accidental_suffix(self.accidental))
    }
}

impl FromStr for NoteName {
    type Err = Error;

    /// Parse note names such as "C", "F#", "Bb", "Cbb" or "Fs"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();

        let letter = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => Letter::C,
            Some('D') => Letter::D,
            Some('E') => Letter::E,
            Some('F') => Letter::F,
            Some('G') => Letter::G,
            Some('A') => Letter::A,
            Some('B') => Letter::B,
            _ => return Err(Error::UnknownNote(s.to_string())),
        };

        let accidental = match chars.as_str() {
            "" => 0,
            "#" | "s" | "S" => 1,
            "##" | "x" => 2,
            "b" => -1,
            "bb" => -2,
            _ => return Err(Error::UnknownNote(s.to_string())),
        };

        Ok(NoteName::new(letter, accidental))
    }
}

impl TryFrom<String> for NoteName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NoteName> for String {
    fn from(name: NoteName) -> Self {
        name.to_string()
    }
}

/// Accidental suffix for a semitone difference from the natural letter
fn accidental_suffix(diff: i8) -> &'static str {
    match diff {
        0 => "",
        1 => "#",
        d if d > 1 => "##",
        -1 => "b",
        _ => "bb",
    }
}

/// Scale kinds offered by the plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    /// Ionian
    #[default]
    Major,
    /// Aeolian
    NaturalMinor,
    HarmonicMinor,
    /// Ascending form
    MelodicMinor,
    /// No scale selected
    Invalid,
}

impl ScaleKind {
    /// Every selectable scale kind, in menu order
    pub const ALL: [ScaleKind; 4] = [
        ScaleKind::Major,
        ScaleKind::NaturalMinor,
        ScaleKind::HarmonicMinor,
        ScaleKind::MelodicMinor,
    ];

    /// Get the intervals (semitones from root) for this scale kind
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleKind::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleKind::Invalid => &[],
        }
    }

    /// Get a human-readable name for this scale kind
    pub fn name(self) -> &'static str {
        match self {
            ScaleKind::Major => "Major/Ionian",
            ScaleKind::NaturalMinor => "Natural Minor",
            ScaleKind::HarmonicMinor => "Harmonic Minor",
            ScaleKind::MelodicMinor => "Melodic Minor",
            ScaleKind::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-', '_', '/'], "");
        match key.as_str() {
            "major" | "ionian" | "majorionian" => Ok(ScaleKind::Major),
            "minor" | "naturalminor" | "aeolian" => Ok(ScaleKind::NaturalMinor),
            "harmonicminor" => Ok(ScaleKind::HarmonicMinor),
            "melodicminor" => Ok(ScaleKind::MelodicMinor),
            "invalid" | "none" => Ok(ScaleKind::Invalid),
            _ => Err(Error::UnknownScale(s.to_string())),
        }
    }
}

/// A set of pitch classes packed into the low 12 bits of a `u16`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub const EMPTY: PitchClassSet = PitchClassSet(0);

    /// Build a set from intervals, rotated by `root` semitones
    pub fn from_intervals(intervals: &[u8], root: PitchClass) -> Self {
        let mask = intervals.iter().fold(0u16, |mask, &interval| {
            mask | 1 << ((interval + root) % OCTAVE_STEPS)
        });
        PitchClassSet(mask)
    }

    /// Raw 12-bit mask
    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, pc: PitchClass) -> bool {
        self.0 & (1 << (pc % OCTAVE_STEPS)) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate members in ascending pitch-class order
    pub fn iter(self) -> impl Iterator<Item = PitchClass> {
        (0..OCTAVE_STEPS).filter(move |&pc| self.contains(pc))
    }

    /// Signed distance to the nearest member (ties resolve downward)
    pub fn nearest_offset(self, pc: PitchClass) -> Option<i8> {
        if self.is_empty() {
            return None;
        }

        let pc = pc % OCTAVE_STEPS;
        (0..=6i8).find_map(|distance| {
            let below = (pc as i8 - distance).rem_euclid(12) as PitchClass;
            let above = (pc as i8 + distance).rem_euclid(12) as PitchClass;
            if self.contains(below) {
                Some(-distance)
            } else if self.contains(above) {
                Some(distance)
            } else {
                None
            }
        })
    }
}

/// A scale selection: optional root plus kind, with derived pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    root: Option<NoteName>,
    kind: ScaleKind,
    pitch_classes: PitchClassSet,
}

impl Scale {
    /// Create a new scale. Without a root the interval row is left unrotated.
    pub fn new(root: Option<NoteName>, kind: ScaleKind) -> Self {
        let rotation = root.map(NoteName::pitch_class).unwrap_or(0);
        Self {
            root,
            kind,
            pitch_classes: PitchClassSet::from_intervals(kind.intervals(), rotation),
        }
    }

    /// Get the root note, if one is selected
    pub fn root(&self) -> Option<NoteName> {
        self.root
    }

    /// Get the scale kind
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Active pitch classes
    pub fn pitch_classes(&self) -> PitchClassSet {
        self.pitch_classes
    }

    /// Check if a MIDI note's pitch class belongs to the scale
    pub fn contains_midi(&self, midi_note: MidiNote) -> bool {
        self.pitch_classes.contains(midi_note % OCTAVE_STEPS)
    }

    /// Whether a note passes the scale filter. No root means no filtering.
    pub fn allows(&self, midi_note: MidiNote) -> bool {
        self.root.is_none() || self.contains_midi(midi_note)
    }

    /// Get the scale degree (0-based) of a MIDI note, if it's in the scale
    pub fn degree_of(&self, midi_note: MidiNote) -> Option<usize> {
        let root = self.root?.pitch_class();
        let pc = midi_note % OCTAVE_STEPS;
        self.kind
            .intervals()
            .iter()
            .position(|&interval| (interval + root) % OCTAVE_STEPS == pc)
    }

    /// Spell a MIDI note as a degree of this scale, e.g. "Bb" in F major.
    ///
    /// Returns `None` when there is no root, the kind is invalid or the note
    /// is outside the scale.
    pub fn degree_label(&self, midi_note: MidiNote) -> Option<String> {
        let root = self.root?;
        let degree = self.degree_of(midi_note)?;

        let letter = root.letter().step(degree);
        let pc = (midi_note % OCTAVE_STEPS) as i8;
        let mut diff = pc - letter.natural_pitch_class() as i8;
        if diff.abs() > 5 {
            diff = if diff > 0 { diff - 12 } else { diff + 12 };
        }

        Some(format!("{}{}", letter, accidental_suffix(diff)))
    }

    /// Move a MIDI note onto the nearest scale tone (ties resolve downward)
    pub fn quantize(&self, midi_note: MidiNote) -> MidiNote {
        match self.pitch_classes.nearest_offset(midi_note % OCTAVE_STEPS) {
            Some(offset) => (midi_note as i16 + offset as i16).clamp(0, 127) as MidiNote,
            None => midi_note,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => write!(f, "{} {}", root, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}
