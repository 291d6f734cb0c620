//! Linguistic analysis seams — sentence segmentation and sentiment
//! classification are supplied by external taggers through these traits.

pub mod annotated;

pub use annotated::{AnnotatedDocument, NeutralClassifier};

use serde::{Deserialize, Serialize};

use crate::error::SonifyError;
use crate::unit::{is_punctuation_token, WordUnit};

/// Neutral class on the five-point (0 very negative .. 4 very positive) scale.
pub const NEUTRAL_SENTIMENT: i32 = 2;

/// One tagged word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    #[serde(default)]
    pub lemma: String,
    /// Penn-style part-of-speech tag ("NN", "VBZ", ".").
    #[serde(default)]
    pub pos: String,
    /// Per-word sentiment score, if the tagger supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    /// Sentiment class of the word on its own, same scale as sentences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<i32>,
}

impl Token {
    pub fn new(word: impl Into<String>, lemma: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            sentiment: None,
            class: None,
        }
    }

    /// Lemma, falling back to the word itself when the tagger gave none.
    pub fn lemma_or_word(&self) -> &str {
        if self.lemma.is_empty() {
            &self.word
        } else {
            &self.lemma
        }
    }
}

/// An ordered run of tokens with an optional sentence-level class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<i32>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            sentiment: None,
        }
    }

    /// The sentence as plain text; punctuation attaches to the previous word.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            if !out.is_empty() && !is_punctuation_token(&token.word) {
                out.push(' ');
            }
            out.push_str(&token.word);
        }
        out
    }

    /// Word units carrying each token's sentiment score and class.
    pub fn word_units(&self) -> Vec<WordUnit> {
        self.tokens
            .iter()
            .map(|t| {
                let mut unit = WordUnit::new(t.word.clone(), t.lemma_or_word(), &t.pos);
                unit.sentiment = t.sentiment;
                unit.sentiment_class = t.class;
                unit
            })
            .collect()
    }
}

/// Splits text into tagged sentences.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Result<Vec<Sentence>, SonifyError>;
}

/// Classifies sentence sentiment and optionally scores single words.
pub trait SentimentClassifier {
    fn classify(&self, sentence: &str) -> Result<i32, SonifyError>;

    /// Signed per-word score; positive above zero.
    fn word_score(&self, _word: &str) -> Option<f64> {
        None
    }
}
