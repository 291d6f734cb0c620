//! Typed instructions: a trigger, the modifier it fires and how the
//! modifier's value combines with the current one.

use serde::{Deserialize, Serialize};

use crate::unit::{CharUnit, WordClass};

/// Comparison used by length triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Greater,
    Less,
}

impl Comparison {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" | "equal" | "equals" => Some(Comparison::Equal),
            ">" | "gt" | "greater" | "greater_than" => Some(Comparison::Greater),
            "<" | "lt" | "less" | "less_than" => Some(Comparison::Less),
            _ => None,
        }
    }

    /// Whether `lhs <op> rhs` holds.
    pub fn holds(self, lhs: usize, rhs: usize) -> bool {
        match self {
            Comparison::Equal => lhs == rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::Less => lhs < rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "+" => Some(Polarity::Positive),
            "negative" | "-" => Some(Polarity::Negative),
            _ => None,
        }
    }

    /// Whether `score` has this polarity. Zero has neither.
    pub fn matches(self, score: f64) -> bool {
        match self {
            Polarity::Positive => score > 0.0,
            Polarity::Negative => score < 0.0,
        }
    }
}

/// Character classes a character unit can be tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterClass {
    Vowel,
    Consonant,
    Uppercase,
    Lowercase,
}

impl CharacterClass {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vowel" | "vowels" => Some(CharacterClass::Vowel),
            "consonant" | "consonants" => Some(CharacterClass::Consonant),
            "uppercase" | "upper" => Some(CharacterClass::Uppercase),
            "lowercase" | "lower" => Some(CharacterClass::Lowercase),
            _ => None,
        }
    }

    pub fn matches(self, unit: &CharUnit) -> bool {
        match self {
            CharacterClass::Vowel => unit.is_vowel(),
            CharacterClass::Consonant => unit.is_consonant(),
            CharacterClass::Uppercase => unit.ch.is_uppercase(),
            CharacterClass::Lowercase => unit.ch.is_lowercase(),
        }
    }
}

/// The condition an instruction tests on each unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// The word's tag maps to this class.
    CategoryMatch(WordClass),
    /// The word's length in characters compares against `length`.
    LengthCompare { op: Comparison, length: usize },
    /// The lexical code being sounded equals this value.
    CodeEquals(u32),
    /// The word's lemma equals this text; for characters, the character
    /// equals its first character.
    LiteralMatch(String),
    /// The word's sentiment score has this sign.
    SentimentPolarity(Polarity),
    /// The character belongs to this class.
    CharacterClass(CharacterClass),
}

/// How a numeric modifier value is combined with the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    #[default]
    Set,
    Add,
}

impl ChangeMode {
    /// `value` when setting, `current + value` when adding.
    pub fn combine(self, current: f64, value: f64) -> f64 {
        match self {
            ChangeMode::Set => value,
            ChangeMode::Add => current + value,
        }
    }
}

/// What an instruction changes when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum SoundModifier {
    Tempo(f64),
    NoteDuration(f64),
    Octave(f64),
    Instrument(String),
    Volume(f64),
    /// General MIDI percussion key.
    Percussion(u8),
    /// MIDI note number whose frequency replaces the candidate frequency.
    NoteByName(u8),
    Attack(f64),
    Decay(f64),
    PitchBend(f64),
    Pan(f64),
    /// Chord magnitude used when the trigger carries no sentiment.
    MajorChord(f64),
    MinorChord(f64),
}

/// A validated rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub trigger: Trigger,
    pub modifier: SoundModifier,
    pub mode: ChangeMode,
}

impl Instruction {
    pub fn new(trigger: Trigger, modifier: SoundModifier, mode: ChangeMode) -> Self {
        Self {
            trigger,
            modifier,
            mode,
        }
    }
}
