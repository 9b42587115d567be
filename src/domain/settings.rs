// Tracker settings - Angle bands, speed bounds and scoring knobs
use serde::Deserialize;

/// Inclusive angle range in degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AngleBand {
    pub min: f64,
    pub max: f64,
}

impl AngleBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }
}

/// Points deducted from the form-maintenance score per distinct issue
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IssuePenalties {
    pub incomplete_range_of_motion: f64,
    pub excessive_swing: f64,
    pub movement_too_fast: f64,
    pub movement_too_slow: f64,
}

impl Default for IssuePenalties {
    fn default() -> Self {
        Self {
            incomplete_range_of_motion: 15.0,
            excessive_swing: 20.0,
            movement_too_fast: 10.0,
            movement_too_slow: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Arm extended, where every rep starts and ends
    pub start_band: AngleBand,
    /// Full contraction, where the hold is measured
    pub peak_band: AngleBand,
    pub ideal_start_angle: f64,
    pub ideal_peak_angle: f64,
    pub start_tolerance: f64,
    pub peak_tolerance: f64,
    /// Minimum `start - peak` before the score gets scaled down
    pub min_range_of_motion: f64,
    /// Degrees per second
    pub min_speed: f64,
    pub max_speed: f64,
    /// Seconds the angle must stay in the peak band
    pub rep_hold_time: f64,
    pub min_rep_duration: f64,
    pub min_reps_per_set: u32,
    pub max_reps_per_set: u32,
    pub penalties: IssuePenalties,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            start_band: AngleBand::new(140.0, 180.0),
            peak_band: AngleBand::new(30.0, 110.0),
            ideal_start_angle: 160.0,
            ideal_peak_angle: 90.0,
            start_tolerance: 10.0,
            peak_tolerance: 5.0,
            min_range_of_motion: 45.0,
            min_speed: 20.0,
            max_speed: 100.0,
            rep_hold_time: 1.0,
            min_rep_duration: 1.5,
            min_reps_per_set: 8,
            max_reps_per_set: 12,
            penalties: IssuePenalties::default(),
        }
    }
}
