//! Frequency ↔ note conversion — octave normalisation, semitone quantisation,
//! and the pitch-bend residual that keeps sub-semitone detail.
//!
//! Codes come from one of two spaces: lexical-category codes (45 categories,
//! zero-based) for words, and 1-based alphabet positions (26 letters) for
//! characters. A code chooses both the candidate frequency (its harmonic of
//! the base frequency) and the octave ceiling the frequency is folded under.

pub mod chord;
pub mod note;

pub use chord::{chord_variant, Chord, ChordQuality, MAJOR_CHORDS, MINOR_CHORDS};
pub use note::{midi_to_frequency, parse_note_name};

use crate::param::ZERO_FLOOR;

/// Concert A.
pub const A4_FREQUENCY: f64 = 440.0;
/// MIDI note number of concert A.
pub const A4_MIDI: i32 = 69;

/// Pitch-bend value meaning "no bend".
pub const BEND_CENTER: i64 = 8192;
/// Pitch-bend units per semitone.
pub const BEND_PER_SEMITONE: f64 = 4096.0;
/// Largest 14-bit pitch-bend value.
pub const BEND_MAX: i64 = 16383;

/// Size of the lexical-category space.
pub const LEXICAL_CATEGORY_COUNT: f64 = 45.0;
/// Size of the letter orderings.
pub const ALPHABET_SIZE: f64 = 26.0;
/// Code used for punctuation regardless of lexical lookup.
pub const PUNCTUATION_CODE: u32 = 46;

/// A code together with the space it was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// Zero-based lexical-category code.
    Lexical(u32),
    /// One-based position in a letter ordering.
    Alphabet(u32),
}

impl Code {
    /// The raw numeric code, as instructions compare it.
    pub fn value(self) -> u32 {
        match self {
            Code::Lexical(c) | Code::Alphabet(c) => c,
        }
    }

    /// Multiple of the base frequency this code sounds at.
    pub fn harmonic(self) -> f64 {
        match self {
            Code::Lexical(c) => c as f64 + 1.0,
            Code::Alphabet(p) => p as f64,
        }
    }

    /// Number of octaves above the base frequency this code may reach.
    pub fn target_octave(self, octave_span: f64) -> u32 {
        let fraction = match self {
            Code::Lexical(c) => (c as f64 + 1.0) / LEXICAL_CATEGORY_COUNT,
            Code::Alphabet(p) => p as f64 / ALPHABET_SIZE,
        };
        let octave = (fraction * octave_span).ceil();
        if octave.is_finite() && octave > 0.0 {
            octave as u32
        } else {
            0
        }
    }
}

/// `base * 2^target_octave`, computed by repeated doubling.
pub fn top_frequency(base_frequency: f64, target_octave: u32) -> f64 {
    let mut top = base_frequency;
    for _ in 0..target_octave {
        top *= 2.0;
    }
    top
}

/// Halve `frequency` until it sits at or below `top`.
pub fn fold_under(frequency: f64, top: f64) -> f64 {
    let mut f = frequency;
    if !f.is_finite() || top <= 0.0 {
        return top;
    }
    while f > top {
        f /= 2.0;
    }
    f
}

/// Nearest MIDI note number (A4 = 440 Hz = 69).
pub fn frequency_to_midi(frequency: f64) -> i32 {
    (12.0 * (frequency / A4_FREQUENCY).log2() + A4_MIDI as f64).round() as i32
}

/// Pitch-bend that lifts `midi` to `frequency`. 8192 is centre, 4096 units
/// per semitone.
pub fn pitch_bend(frequency: f64, midi: i32) -> i64 {
    let quantised = A4_FREQUENCY * 2f64.powf((midi - A4_MIDI) as f64 / 12.0);
    (BEND_CENTER as f64 + BEND_PER_SEMITONE * 12.0 * (frequency / quantised).log2()).round() as i64
}

/// A frequency resolved to a note number plus bend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotePitch {
    /// The folded frequency actually sounded.
    pub frequency: f64,
    /// Highest frequency the code's octave allows.
    pub top_frequency: f64,
    pub midi: i32,
    pub bend: i64,
}

impl NotePitch {
    /// Note number limited to the 7-bit MIDI range.
    pub fn midi_u8(&self) -> u8 {
        self.midi.clamp(0, 127) as u8
    }
}

/// Fold `frequency` under the ceiling for `target_octave` and quantise it.
///
/// A frequency that is not positive and finite after folding sounds at
/// [`ZERO_FLOOR`] Hz, which lands on note 0.
pub fn resolve(frequency: f64, base_frequency: f64, target_octave: u32) -> NotePitch {
    let top = top_frequency(base_frequency, target_octave);
    let folded = fold_under(frequency, top);
    let folded = if folded > 0.0 && folded.is_finite() {
        folded
    } else {
        ZERO_FLOOR
    };
    let midi = frequency_to_midi(folded);
    NotePitch {
        frequency: folded,
        top_frequency: top,
        midi,
        bend: pitch_bend(folded, midi),
    }
}
