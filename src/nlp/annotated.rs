//! Pre-tagged documents — the output of any external tagger saved as YAML
//! or JSON, replayed as a [`Segmenter`] and [`SentimentClassifier`].
//!
//! ```yaml
//! sentences:
//!   - sentiment: 3
//!     tokens:
//!       - { word: Cat, lemma: cat, pos: NN, class: 2 }
//!       - { word: runs, lemma: run, pos: VBZ, sentiment: 0.2 }
//!       - { word: ".", lemma: ".", pos: "." }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Segmenter, Sentence, SentimentClassifier, NEUTRAL_SENTIMENT};
use crate::error::SonifyError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub sentences: Vec<Sentence>,
}

impl AnnotatedDocument {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// Load YAML, or JSON when the extension is `.json`.
    pub fn from_path(path: &Path) -> Result<Self, SonifyError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&content)
                .map_err(|e| SonifyError::Config(format!("{}: {e}", path.display())))
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| SonifyError::Config(format!("{}: {e}", path.display())))
        }
    }

    /// Plain text of the whole document.
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .map(Sentence::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Segmenter for AnnotatedDocument {
    /// The document is already segmented; `text` is ignored.
    fn segment(&self, _text: &str) -> Result<Vec<Sentence>, SonifyError> {
        Ok(self.sentences.clone())
    }
}

impl SentimentClassifier for AnnotatedDocument {
    /// The recorded class of the matching sentence, neutral otherwise.
    fn classify(&self, sentence: &str) -> Result<i32, SonifyError> {
        Ok(self
            .sentences
            .iter()
            .find(|s| s.text() == sentence)
            .and_then(|s| s.sentiment)
            .unwrap_or(NEUTRAL_SENTIMENT))
    }
}

/// Classifies everything as neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralClassifier;

impl SentimentClassifier for NeutralClassifier {
    fn classify(&self, _sentence: &str) -> Result<i32, SonifyError> {
        Ok(NEUTRAL_SENTIMENT)
    }
}
