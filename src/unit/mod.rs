//! Linguistic units — the words and characters that get sonified.

pub mod ordering;

pub use ordering::LetterOrdering;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Lexical-database parts of speech that have category codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

/// Grammatical class, derived from the first letter of a Penn-style tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordClass {
    Adjective,
    Noun,
    Adverb,
    Verb,
    Modal,
    Symbol,
    Determiner,
    Preposition,
    Pronoun,
    Other,
}

impl WordClass {
    pub fn from_tag(tag: char) -> Self {
        match tag.to_ascii_uppercase() {
            'J' => WordClass::Adjective,
            'N' => WordClass::Noun,
            'R' => WordClass::Adverb,
            'V' => WordClass::Verb,
            'M' => WordClass::Modal,
            'S' => WordClass::Symbol,
            'D' => WordClass::Determiner,
            'I' => WordClass::Preposition,
            'P' => WordClass::Pronoun,
            _ => WordClass::Other,
        }
    }

    /// Parse the category names instructions use ("noun", "verb", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "adjective" => Some(WordClass::Adjective),
            "noun" => Some(WordClass::Noun),
            "adverb" => Some(WordClass::Adverb),
            "verb" => Some(WordClass::Verb),
            "modal" => Some(WordClass::Modal),
            "symbol" => Some(WordClass::Symbol),
            "determiner" => Some(WordClass::Determiner),
            "preposition" => Some(WordClass::Preposition),
            "pronoun" => Some(WordClass::Pronoun),
            _ => None,
        }
    }

    /// The part of speech to look up, for classes the lexical database covers.
    pub fn part_of_speech(self) -> Option<PartOfSpeech> {
        match self {
            WordClass::Adjective => Some(PartOfSpeech::Adjective),
            WordClass::Noun => Some(PartOfSpeech::Noun),
            WordClass::Adverb => Some(PartOfSpeech::Adverb),
            WordClass::Verb => Some(PartOfSpeech::Verb),
            _ => None,
        }
    }

    /// Fixed category code for closed classes that are never looked up.
    pub fn fixed_code(self) -> Option<u32> {
        match self {
            WordClass::Determiner | WordClass::Symbol => Some(46),
            WordClass::Modal => Some(45),
            WordClass::Pronoun => Some(51),
            WordClass::Preposition => Some(48),
            _ => None,
        }
    }
}

/// Whether `c` counts as punctuation: ASCII punctuation plus the common
/// Unicode marks (dashes, curly quotes, guillemets, ellipsis, inverted marks).
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(c, '\u{2010}'..='\u{2027}' | '\u{00A1}' | '\u{00AB}' | '\u{00BB}' | '\u{00BF}')
}

/// A token made of exactly one punctuation character.
pub fn is_punctuation_token(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_punctuation(c))
}

/// A word with its annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct WordUnit {
    pub text: String,
    pub lemma: String,
    /// First letter of the part-of-speech tag; `S` for punctuation tokens.
    pub tag: char,
    /// Lexical-category codes, ascending.
    pub codes: BTreeSet<u32>,
    /// Per-word sentiment score: positive above zero, negative below.
    pub sentiment: Option<f64>,
    /// Sentiment class of the word itself.
    pub sentiment_class: Option<i32>,
}

impl WordUnit {
    /// Build a word from a tagger token. Single punctuation characters are
    /// tagged `S` whatever the tagger said.
    pub fn new(text: impl Into<String>, lemma: impl Into<String>, pos_tag: &str) -> Self {
        let text = text.into();
        let tag = if is_punctuation_token(&text) {
            'S'
        } else {
            pos_tag
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?')
        };
        Self {
            text,
            lemma: lemma.into(),
            tag,
            codes: BTreeSet::new(),
            sentiment: None,
            sentiment_class: None,
        }
    }

    pub fn class(&self) -> WordClass {
        WordClass::from_tag(self.tag)
    }

    /// Length of the raw text in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A single character with its ordering position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharUnit {
    pub ch: char,
    /// 1-based position in `ordering`; `None` outside A–Z.
    pub position: Option<u32>,
    pub ordering: LetterOrdering,
}

impl CharUnit {
    pub fn new(ch: char, ordering: LetterOrdering) -> Self {
        Self {
            ch,
            position: ordering.position(ch),
            ordering,
        }
    }

    pub fn is_vowel(&self) -> bool {
        "AEIOUaeiou".contains(self.ch)
    }

    pub fn is_consonant(&self) -> bool {
        self.ch.is_alphabetic() && !self.is_vowel()
    }

    pub fn is_punctuation(&self) -> bool {
        is_punctuation(self.ch)
    }
}

/// One unit of input to the sonifier.
#[derive(Debug, Clone, PartialEq)]
pub enum LinguisticUnit {
    Word(WordUnit),
    Character(CharUnit),
}

impl LinguisticUnit {
    /// Raw text length in characters.
    pub fn text_len(&self) -> usize {
        match self {
            LinguisticUnit::Word(w) => w.len(),
            LinguisticUnit::Character(_) => 1,
        }
    }
}
