//! Error types shared by the sonification engine and its adapters.

use std::fmt;
use std::io;

/// Which external collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Segmentation,
    Classification,
    LexicalLookup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Segmentation => "segmentation",
            Stage::Classification => "classification",
            Stage::LexicalLookup => "lexical lookup",
        };
        f.write_str(name)
    }
}

/// An error raised while configuring or running a sonification session.
#[derive(Debug)]
pub enum SonifyError {
    /// An instruction could not be validated. `index` is its position in the
    /// caller-supplied list.
    InvalidInstruction { index: usize, message: String },
    /// A parameter bound or value is unusable (e.g. `min >= max`).
    InvalidParameter(String),
    /// An external collaborator failed; the current run is aborted.
    Collaborator { stage: Stage, message: String },
    /// A configuration or data file could not be parsed.
    Config(String),
    /// MIDI export or playback failed.
    Midi(String),
    Io(io::Error),
}

impl SonifyError {
    pub fn instruction(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidInstruction {
            index,
            message: message.into(),
        }
    }

    pub fn collaborator(stage: Stage, message: impl Into<String>) -> Self {
        Self::Collaborator {
            stage,
            message: message.into(),
        }
    }

    /// Attribute an error to `stage` unless it already names a collaborator.
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            SonifyError::Collaborator { .. } => self,
            other => Self::collaborator(stage, other.to_string()),
        }
    }
}

impl fmt::Display for SonifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SonifyError::InvalidInstruction { index, message } => {
                write!(f, "instruction #{index}: {message}")
            }
            SonifyError::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            SonifyError::Collaborator { stage, message } => {
                write!(f, "{stage} failed: {message}")
            }
            SonifyError::Config(message) => write!(f, "config: {message}"),
            SonifyError::Midi(message) => write!(f, "midi: {message}"),
            SonifyError::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for SonifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SonifyError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SonifyError {
    fn from(e: io::Error) -> Self {
        SonifyError::Io(e)
    }
}
