//! Sentiment-to-chord mapping.
//!
//! A sentiment magnitude picks a chord variant from an ordered table: the
//! stronger the sentiment, the richer the chord. Indices past the end
//! saturate at the last entry instead of wrapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Major chord variants, plainest first.
pub const MAJOR_CHORDS: [&str; 8] = [
    "maj", "maj6", "maj7", "maj9", "add9", "maj6%9", "maj7%6", "maj13",
];

/// Minor chord variants, plainest first.
pub const MINOR_CHORDS: [&str; 10] = [
    "min", "min6", "min7", "min9", "min11", "min7%11", "minadd9", "min6%9", "minmaj7", "minmaj9",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
}

impl ChordQuality {
    pub fn table(self) -> &'static [&'static str] {
        match self {
            ChordQuality::Major => &MAJOR_CHORDS,
            ChordQuality::Minor => &MINOR_CHORDS,
        }
    }
}

/// Table index for a sentiment magnitude: `round(magnitude * 10)`, pulled
/// down to the last entry if it overflows. Negative and NaN magnitudes select
/// the plainest chord.
pub fn chord_index(quality: ChordQuality, magnitude: f64) -> usize {
    let last = quality.table().len() - 1;
    let scaled = (magnitude * 10.0).round();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else if scaled >= last as f64 {
        last
    } else {
        scaled as usize
    }
}

/// Chord variant name for a sentiment magnitude.
pub fn chord_variant(quality: ChordQuality, magnitude: f64) -> &'static str {
    quality.table()[chord_index(quality, magnitude)]
}

/// A chord built on a note number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    pub root: u8,
    pub quality: ChordQuality,
    pub variant: &'static str,
}

impl Chord {
    pub fn new(root: u8, quality: ChordQuality, magnitude: f64) -> Self {
        Self {
            root,
            quality,
            variant: chord_variant(quality, magnitude),
        }
    }

    /// Semitone offsets above the root.
    pub fn intervals(&self) -> &'static [u8] {
        match self.variant {
            "maj6" => &[0, 4, 7, 9],
            "maj7" => &[0, 4, 7, 11],
            "maj9" => &[0, 4, 7, 11, 14],
            "add9" => &[0, 4, 7, 14],
            "maj6%9" => &[0, 4, 7, 9, 14],
            "maj7%6" => &[0, 4, 7, 9, 11],
            "maj13" => &[0, 4, 7, 11, 14, 21],
            "min" => &[0, 3, 7],
            "min6" => &[0, 3, 7, 9],
            "min7" => &[0, 3, 7, 10],
            "min9" => &[0, 3, 7, 10, 14],
            "min11" => &[0, 3, 7, 10, 14, 17],
            "min7%11" => &[0, 3, 7, 10, 17],
            "minadd9" => &[0, 3, 7, 14],
            "min6%9" => &[0, 3, 7, 9, 14],
            "minmaj7" => &[0, 3, 7, 11],
            "minmaj9" => &[0, 3, 7, 11, 14],
            _ => &[0, 4, 7],
        }
    }

    /// Note numbers of the chord; tones above 127 are dropped.
    pub fn notes(&self) -> Vec<u8> {
        self.intervals()
            .iter()
            .filter_map(|&i| {
                let n = self.root as u16 + i as u16;
                (n <= 127).then_some(n as u8)
            })
            .collect()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.variant)
    }
}
