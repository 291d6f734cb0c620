//! Playback state — the working values the rule pipeline mutates, and the
//! base values every unit resets to.

use crate::param::{Axis, ParameterStore};
use crate::pitch::ChordQuality;

/// How an instruction has adjusted the computed pitch-bend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BendAdjust {
    /// Use the bend the frequency conversion produced.
    Computed,
    /// Add this many bend units to the computed bend.
    Offset(f64),
    /// Ignore the computed bend and use this value.
    Fixed(f64),
}

impl BendAdjust {
    /// Final bend for a note whose frequency conversion produced `computed`.
    pub fn resolve(self, computed: i64, store: &mut ParameterStore) -> u16 {
        let bend = match self {
            BendAdjust::Computed => computed as f64,
            BendAdjust::Offset(offset) => store.keep_in_range(Axis::PitchBend, computed as f64 + offset),
            BendAdjust::Fixed(value) => value,
        };
        bend.round().clamp(0.0, 16383.0) as u16
    }
}

/// A chord selected for the current note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordChoice {
    pub quality: ChordQuality,
    pub magnitude: f64,
}

/// One full set of axis values.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Beats per minute.
    pub tempo: f64,
    /// Note length in whole notes.
    pub note_length: f64,
    /// Candidate frequency for the code being sounded.
    pub frequency: f64,
    /// Octave span codes are spread across.
    pub octaves: f64,
    pub instrument: String,
    pub volume: f64,
    pub attack: f64,
    pub decay: f64,
    pub pan: f64,
    pub bend: BendAdjust,
    pub chord: Option<ChordChoice>,
}

/// Current values plus the base they reset to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current: Settings,
    pub base: Settings,
}

impl PlaybackState {
    pub fn new(base: Settings) -> Self {
        Self {
            current: base.clone(),
            base,
        }
    }

    /// Restore every current value to its base value.
    pub fn reset(&mut self) {
        self.current.clone_from(&self.base);
    }
}
