//! A single bounded parameter with bounce-back clamping.
//!
//! Out-of-range values are reflected back across the violated bound instead
//! of being pinned to it. A rolling average of which side the violations come
//! from drives a `direction` hint that flips once pushes in one direction have
//! been sustained.

use crate::error::SonifyError;

/// Substitute floor for a configured minimum of exactly zero. A zero floor
/// could never be left again by multiplicative adjustment.
pub const ZERO_FLOOR: f64 = 0.0001;

/// Rolling-average threshold beyond which `direction` flips.
const FLIP_THRESHOLD: f64 = 0.8;

/// Bounds and directional bookkeeping for one tunable axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSetting {
    min: f64,
    max: f64,
    direction: bool,
    direction_rolling_average: f64,
}

impl ParameterSetting {
    /// Create a setting for `[min, max]`.
    ///
    /// A `min` of exactly zero is replaced with [`ZERO_FLOOR`]. Bounds must be
    /// finite, `min` must not be negative, and `min` must end up strictly
    /// below `max`. Every axis is a frequency, length, count or 7/14-bit
    /// controller value, none of which has a meaning below zero.
    pub fn new(min: f64, max: f64) -> Result<Self, SonifyError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(SonifyError::InvalidParameter(format!(
                "bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min < 0.0 {
            return Err(SonifyError::InvalidParameter(format!(
                "min {min} must not be negative"
            )));
        }
        let min = if min == 0.0 { ZERO_FLOOR } else { min };
        if min >= max {
            return Err(SonifyError::InvalidParameter(format!(
                "min {min} must be below max {max}"
            )));
        }
        Ok(Self {
            min,
            max,
            direction: true,
            direction_rolling_average: 0.0,
        })
    }

    /// Build from bounds known to be valid (the built-in axis defaults).
    pub(crate) fn with_trusted_bounds(min: f64, max: f64) -> Self {
        Self {
            min: if min == 0.0 { ZERO_FLOOR } else { min },
            max,
            direction: true,
            direction_rolling_average: 0.0,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// The directional hint. Starts `true` and flips whenever the rolling
    /// average of out-of-range pushes crosses ±0.8.
    pub fn direction(&self) -> bool {
        self.direction
    }

    pub fn direction_rolling_average(&self) -> f64 {
        self.direction_rolling_average
    }

    /// Bring `value` into `[min, max]`.
    ///
    /// In-range values pass through untouched. A value below `min` is
    /// reflected upward from `min`, a value above `max` downward from `max`;
    /// if the reflection still lands outside the open range it is folded in
    /// with `abs(reflected) mod (max - min) + min`.
    pub fn keep_in_range(&mut self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }

        if value < self.min {
            self.record_push(-1.0);
            if value == f64::NEG_INFINITY {
                return self.min;
            }
            self.fold(self.min + (self.min - value))
        } else if value > self.max {
            self.record_push(1.0);
            if value == f64::INFINITY {
                return self.max;
            }
            self.fold(self.max - (value - self.max))
        } else {
            value
        }
    }

    fn record_push(&mut self, side: f64) {
        self.direction_rolling_average = (self.direction_rolling_average + side) / 2.0;
        if self.direction_rolling_average.abs() > FLIP_THRESHOLD {
            self.direction = !self.direction;
        }
    }

    fn fold(&self, reflected: f64) -> f64 {
        if reflected > self.min && reflected < self.max {
            reflected
        } else {
            (reflected.abs() % (self.max - self.min)) + self.min
        }
    }
}
