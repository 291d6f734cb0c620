//! Bounded parameter store — one [`ParameterSetting`] per tunable axis.
//!
//! Every numeric knob the rule pipeline touches is routed through
//! [`ParameterStore::keep_in_range`] before it is committed.

pub mod setting;

pub use setting::{ParameterSetting, ZERO_FLOOR};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SonifyError;

/// A tunable axis with fixed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    NoteLength,
    ArpeggiateGap,
    RestLength,
    BaseFrequency,
    Octaves,
    Tempo,
    LetterOrdering,
    Volume,
    Attack,
    Decay,
    Pan,
    PitchBend,
}

impl Axis {
    pub const ALL: [Axis; 12] = [
        Axis::NoteLength,
        Axis::ArpeggiateGap,
        Axis::RestLength,
        Axis::BaseFrequency,
        Axis::Octaves,
        Axis::Tempo,
        Axis::LetterOrdering,
        Axis::Volume,
        Axis::Attack,
        Axis::Decay,
        Axis::Pan,
        Axis::PitchBend,
    ];

    /// Default `(min, max)` bounds before zero-floor substitution.
    pub fn default_bounds(self) -> (f64, f64) {
        match self {
            Axis::NoteLength => (0.01, 8.0),
            Axis::ArpeggiateGap => (0.001, 0.5),
            Axis::RestLength => (0.01, 0.5),
            Axis::BaseFrequency => (16.0, 20000.0),
            Axis::Octaves => (1.0, 10.0),
            Axis::Tempo => (6.0, 600.0),
            Axis::LetterOrdering => (0.0, 3.0),
            Axis::Volume => (1.0, 16383.0),
            Axis::Attack | Axis::Decay | Axis::Pan => (0.0, 127.0),
            Axis::PitchBend => (0.0, 16383.0),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// All axis settings for one session.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    settings: Vec<ParameterSetting>,
}

impl ParameterStore {
    /// Build a store with the default bounds, replacing any axis listed in
    /// `overrides`.
    pub fn with_bounds(overrides: &BTreeMap<Axis, (f64, f64)>) -> Result<Self, SonifyError> {
        let settings = Axis::ALL
            .iter()
            .map(|&axis| {
                let (min, max) = overrides
                    .get(&axis)
                    .copied()
                    .unwrap_or_else(|| axis.default_bounds());
                ParameterSetting::new(min, max).map_err(|e| {
                    SonifyError::InvalidParameter(format!("{axis:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { settings })
    }

    /// Clamp `value` for `axis`, updating that axis' directional state.
    pub fn keep_in_range(&mut self, axis: Axis, value: f64) -> f64 {
        self.settings[axis.index()].keep_in_range(value)
    }

    /// The directional hint for `axis`.
    pub fn direction(&self, axis: Axis) -> bool {
        self.settings[axis.index()].direction()
    }

    pub fn setting(&self, axis: Axis) -> &ParameterSetting {
        &self.settings[axis.index()]
    }

    /// Effective `(min, max)` for `axis`.
    pub fn bounds(&self, axis: Axis) -> (f64, f64) {
        let s = self.setting(axis);
        (s.min(), s.max())
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        let settings = Axis::ALL
            .iter()
            .map(|&axis| {
                let (min, max) = axis.default_bounds();
                ParameterSetting::with_trusted_bounds(min, max)
            })
            .collect();
        Self { settings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_indices_match_all_order() {
        for (i, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
    }

    #[test]
    fn default_store_uses_default_bounds() {
        let store = ParameterStore::default();
        assert_eq!(store.bounds(Axis::Tempo), (6.0, 600.0));
        assert_eq!(store.bounds(Axis::Attack), (ZERO_FLOOR, 127.0));
        assert_eq!(store.bounds(Axis::LetterOrdering), (ZERO_FLOOR, 3.0));
    }

    #[test]
    fn overrides_replace_bounds() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Axis::Tempo, (40.0, 200.0));
        let store = ParameterStore::with_bounds(&overrides).unwrap();
        assert_eq!(store.bounds(Axis::Tempo), (40.0, 200.0));
        assert_eq!(store.bounds(Axis::Volume), (1.0, 16383.0));
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Axis::Octaves, (4.0, 4.0));
        let err = ParameterStore::with_bounds(&overrides).unwrap_err();
        assert!(err.to_string().contains("Octaves"));
    }

    #[test]
    fn negative_frequency_floor_is_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Axis::BaseFrequency, (-10.0, 1000.0));
        let err = ParameterStore::with_bounds(&overrides).unwrap_err();
        assert!(err.to_string().contains("BaseFrequency"));
    }

    #[test]
    fn axes_keep_independent_state() {
        let mut store = ParameterStore::default();
        for _ in 0..3 {
            store.keep_in_range(Axis::Tempo, 1000.0);
        }
        assert!(!store.direction(Axis::Tempo));
        assert!(store.direction(Axis::Volume));
    }
}
