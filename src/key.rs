//! Chromatic-scale key model.
//!
//! Every key name normalizes to a pitch-class index in `0..12` (C = 0,
//! B = 11) using enharmonic equivalence, so `C#` and `Db` are both 1.
//! A key also carries a spelling preference (sharps or flats) that is only
//! ever used to render note names, never for interval arithmetic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChordError, ChordResult};

/// Key names offered in pickers, in chromatic order starting at C.
pub const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Pitch classes of the conventional flat keys: Db, Eb, F, Gb, Ab, Bb.
const FLAT_KEY_INDICES: [u8; 6] = [1, 3, 5, 6, 8, 10];

/// Natural-letter minor tonics whose relative major is a flat key (Dm, Gm, Cm, Fm).
const FLAT_MINOR_LETTERS: [char; 4] = ['D', 'G', 'C', 'F'];

/// Accidental written after a note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    /// Semitone offset applied to the natural letter.
    pub fn offset(self) -> i8 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }

    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c {
            '#' | '♯' => Some(Accidental::Sharp),
            'b' | '♭' => Some(Accidental::Flat),
            _ => None,
        }
    }
}

/// Semitone offset of a natural note letter above C.
pub(crate) fn letter_semitone(letter: char) -> Option<u8> {
    match letter {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Pitch class of a letter plus accidental, wrapping `Cb` to 11 and `B#` to 0.
pub(crate) fn pitch_class(letter: char, accidental: Accidental) -> Option<u8> {
    let base = letter_semitone(letter)? as i8;
    Some((base + accidental.offset()).rem_euclid(12) as u8)
}

/// Render a pitch class as a note name using sharps or flats.
pub(crate) fn spell_pitch_class(index: u8, flats: bool) -> &'static str {
    let i = (index % 12) as usize;
    if flats {
        FLAT_NAMES[i]
    } else {
        SHARP_NAMES[i]
    }
}

/// Normalize a key name to its pitch-class index (0-11).
///
/// ```
/// use churchcore::normalize_key;
///
/// assert_eq!(normalize_key("Db").unwrap(), normalize_key("C#").unwrap());
/// assert!(normalize_key("H").is_err());
/// ```
pub fn normalize_key(name: &str) -> ChordResult<u8> {
    name.parse::<Key>().map(|k| k.index())
}

/// Whether the key at this pitch class is conventionally written with flats.
///
/// This is the pitch-class table only: Db, Eb, F, Gb, Ab and Bb. It says
/// nothing about how a particular key name spells. Transposition goes through
/// [`Key::prefers_flats`], where a written accidental wins, so `C#` and `F#`
/// spell with sharps even though indices 1 and 6 report `true` here. Use a
/// parsed [`Key`] when the spelling must match the transposer's output.
pub fn key_prefers_flats(index: u8) -> bool {
    FLAT_KEY_INDICES.contains(&(index % 12))
}

/// The twelve picker key names, starting at C.
pub fn list_keys() -> [&'static str; 12] {
    KEY_NAMES
}

/// A musical key: tonic pitch class plus spelling preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    index: u8,
    prefers_flats: bool,
    minor: bool,
}

impl Key {
    /// Tonic pitch class, 0-11.
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn prefers_flats(&self) -> bool {
        self.prefers_flats
    }

    pub fn is_minor(&self) -> bool {
        self.minor
    }

    /// Spell a pitch class the way this key would write it.
    pub fn spell(&self, index: u8) -> &'static str {
        spell_pitch_class(index, self.prefers_flats)
    }

    /// Upward semitone distance from this key's tonic to `other`'s, 0-11.
    pub fn semitones_to(&self, other: &Key) -> u8 {
        (other.index + 12 - self.index) % 12
    }
}

impl FromStr for Key {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChordError::InvalidKey(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();

        let letter = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| letter_semitone(*c).is_some())
            .ok_or_else(invalid)?;

        let rest = chars.as_str();
        let (accidental, rest) = match rest.chars().next().and_then(Accidental::from_char) {
            Some(acc) => (acc, &rest[rest.chars().next().map_or(0, char::len_utf8)..]),
            None => (Accidental::Natural, rest),
        };

        let minor = match rest {
            "" => false,
            "m" | "min" => true,
            _ => return Err(invalid()),
        };

        let index = pitch_class(letter, accidental).ok_or_else(invalid)?;
        let prefers_flats = match accidental {
            Accidental::Flat => true,
            Accidental::Sharp => false,
            Accidental::Natural if minor => FLAT_MINOR_LETTERS.contains(&letter),
            Accidental::Natural => letter == 'F',
        };

        Ok(Key { index, prefers_flats, minor })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spell(self.index))?;
        if self.minor {
            f.write_str("m")?;
        }
        Ok(())
    }
}
