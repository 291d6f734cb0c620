//! Session configuration — base values, note operation and parameter bounds
//! loaded from ~/.textsound/config.yaml.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SonifyError;
use crate::param::Axis;
use crate::unit::LetterOrdering;

/// How a code's candidate frequency is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOperation {
    /// Each code sounds at its harmonic of the base frequency.
    #[default]
    LexNameFreq,
    /// Every code sounds at the base frequency.
    StaticFreq,
    /// As `StaticFreq`, but silenced until an instruction fires.
    Mute,
}

/// Unit granularity for text input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Word,
    Character,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Beats per minute.
    pub tempo: f64,
    /// Note length in whole notes.
    pub note_length: f64,
    /// Gap between a unit's notes and its rest, in whole notes.
    pub note_gap: f64,
    /// Rest after each unit, in whole notes.
    pub rest_length: f64,
    /// Base frequency in Hz.
    pub base_frequency: f64,
    /// Octave span codes are spread across.
    pub octaves: f64,
    pub instrument: String,
    pub volume: f64,
    pub attack: f64,
    pub decay: f64,
    pub pan: f64,
    pub ordering: LetterOrdering,
    pub note_operation: NoteOperation,
    pub granularity: Granularity,
    /// Per-axis `[min, max]` overrides.
    pub bounds: BTreeMap<Axis, (f64, f64)>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            note_length: 0.25,
            note_gap: 1.0 / 32.0,
            rest_length: 1.0 / 16.0,
            base_frequency: 128.0,
            octaves: 5.0,
            instrument: "Piano".into(),
            volume: 10200.0,
            attack: 64.0,
            decay: 64.0,
            pan: 64.0,
            ordering: LetterOrdering::default(),
            note_operation: NoteOperation::default(),
            granularity: Granularity::default(),
            bounds: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Standard location, ~/.textsound/config.yaml.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::home_dir()?.join(".textsound").join("config.yaml"))
    }

    /// Load from the standard path. Returns None if the file is missing or
    /// unreadable.
    pub fn load() -> Option<Self> {
        let content = std::fs::read_to_string(Self::default_path()?).ok()?;
        serde_yaml::from_str(&content).ok()
    }

    /// Load from an explicit path, reporting parse errors.
    pub fn from_path(path: &Path) -> Result<Self, SonifyError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| SonifyError::Config(format!("{}: {e}", path.display())))
    }
}
