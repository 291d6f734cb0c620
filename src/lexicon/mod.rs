//! Lexical-category lookup: lemma plus part of speech to category codes.

pub mod wordnet;

pub use wordnet::WordNetLexicon;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SonifyError;
use crate::unit::PartOfSpeech;

/// Source of lexical-category codes for open-class words.
pub trait LexicalLookup {
    /// All category codes for `lemma` used as `pos`. An unknown word yields
    /// an empty set, not an error.
    fn lookup(&self, lemma: &str, pos: PartOfSpeech) -> Result<BTreeSet<u32>, SonifyError>;
}

impl<T: LexicalLookup + ?Sized> LexicalLookup for &T {
    fn lookup(&self, lemma: &str, pos: PartOfSpeech) -> Result<BTreeSet<u32>, SonifyError> {
        (**self).lookup(lemma, pos)
    }
}

impl<T: LexicalLookup + ?Sized> LexicalLookup for Box<T> {
    fn lookup(&self, lemma: &str, pos: PartOfSpeech) -> Result<BTreeSet<u32>, SonifyError> {
        (**self).lookup(lemma, pos)
    }
}

fn normalise(lemma: &str) -> String {
    lemma.trim().to_lowercase().replace(' ', "_")
}

/// An in-memory table, usually loaded from YAML:
///
/// ```yaml
/// noun:
///   cat: [5, 18]
/// verb:
///   run: [38, 41]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryLexicon {
    entries: BTreeMap<PartOfSpeech, BTreeMap<String, BTreeSet<u32>>>,
}

impl MemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, lemma: &str, pos: PartOfSpeech, codes: impl IntoIterator<Item = u32>) {
        self.entries
            .entry(pos)
            .or_default()
            .entry(normalise(lemma))
            .or_default()
            .extend(codes);
    }

    pub fn with(mut self, lemma: &str, pos: PartOfSpeech, codes: impl IntoIterator<Item = u32>) -> Self {
        self.insert(lemma, pos, codes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load a YAML table, or JSON when the extension is `.json`.
    pub fn from_path(path: &Path) -> Result<Self, SonifyError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let parsed: Self = if is_json {
            serde_json::from_str(&content)
                .map_err(|e| SonifyError::Config(format!("{}: {e}", path.display())))?
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| SonifyError::Config(format!("{}: {e}", path.display())))?
        };
        // re-key so lookups see normalised lemmas
        let mut lexicon = Self::new();
        for (pos, words) in parsed.entries {
            for (lemma, codes) in words {
                lexicon.insert(&lemma, pos, codes);
            }
        }
        Ok(lexicon)
    }
}

impl LexicalLookup for MemoryLexicon {
    fn lookup(&self, lemma: &str, pos: PartOfSpeech) -> Result<BTreeSet<u32>, SonifyError> {
        Ok(self
            .entries
            .get(&pos)
            .and_then(|words| words.get(&normalise(lemma)))
            .cloned()
            .unwrap_or_default())
    }
}
