// Repetition domain models - Samples, in-flight metrics and completed reps
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One elbow-angle observation, timestamp in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleSample {
    pub angle_degrees: f64,
    pub timestamp: f64,
}

impl AngleSample {
    pub fn new(angle_degrees: f64, timestamp: f64) -> Self {
        Self {
            angle_degrees,
            timestamp,
        }
    }
}

/// Why a sample was dropped without touching tracker state
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleRejection {
    #[error("angle is not a finite number")]
    NonFiniteAngle,
    #[error("angle {0:.1}° is outside 0..=180")]
    AngleOutOfRange(f64),
    #[error("timestamp is not a finite number")]
    NonFiniteTimestamp,
    #[error("timestamp {current} does not advance past {previous}")]
    NonIncreasingTimestamp { previous: f64, current: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormIssue {
    #[serde(rename = "incomplete range of motion")]
    IncompleteRangeOfMotion,
    #[serde(rename = "excessive swing")]
    ExcessiveSwing,
    #[serde(rename = "movement too fast")]
    MovementTooFast,
    #[serde(rename = "movement too slow")]
    MovementTooSlow,
}

impl FormIssue {
    pub fn label(&self) -> &'static str {
        match self {
            FormIssue::IncompleteRangeOfMotion => "incomplete range of motion",
            FormIssue::ExcessiveSwing => "excessive swing",
            FormIssue::MovementTooFast => "movement too fast",
            FormIssue::MovementTooSlow => "movement too slow",
        }
    }
}

impl std::fmt::Display for FormIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Accumulator for the rep currently in progress
#[derive(Debug, Clone, PartialEq)]
pub struct RepMetrics {
    pub start_angle: f64,
    /// Most contracted angle seen so far
    pub peak_angle: f64,
    pub started_at: f64,
    pub speeds: Vec<f64>,
    pub hold_time: f64,
    pub hold_satisfied: bool,
    /// Distinct issues in order of first occurrence
    pub issues: Vec<FormIssue>,
    pub duration: f64,
    /// Set once the angle has left the start band
    pub departed: bool,
}

impl RepMetrics {
    pub fn begin(sample: &AngleSample) -> Self {
        Self {
            start_angle: sample.angle_degrees,
            peak_angle: sample.angle_degrees,
            started_at: sample.timestamp,
            speeds: Vec::new(),
            hold_time: 0.0,
            hold_satisfied: false,
            issues: Vec::new(),
            duration: 0.0,
            departed: false,
        }
    }

    /// Records an issue once per rep, returns true when it is new
    pub fn flag(&mut self, issue: FormIssue) -> bool {
        if self.issues.contains(&issue) {
            return false;
        }
        self.issues.push(issue);
        true
    }

    pub fn range_of_motion(&self) -> f64 {
        self.start_angle - self.peak_angle
    }
}

/// Finished repetition, never mutated after it joins a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRep {
    pub sequence: u32,
    pub score: f64,
    pub issues: Vec<FormIssue>,
    pub duration: f64,
    pub start_angle: f64,
    pub peak_angle: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_deduplicates() {
        let mut metrics = RepMetrics::begin(&AngleSample::new(160.0, 0.0));
        assert!(metrics.flag(FormIssue::MovementTooFast));
        assert!(!metrics.flag(FormIssue::MovementTooFast));
        assert!(metrics.flag(FormIssue::ExcessiveSwing));
        assert_eq!(
            metrics.issues,
            vec![FormIssue::MovementTooFast, FormIssue::ExcessiveSwing]
        );
    }

    #[test]
    fn test_issue_serializes_as_label() {
        let json = serde_json::to_string(&FormIssue::IncompleteRangeOfMotion).unwrap();
        assert_eq!(json, "\"incomplete range of motion\"");
    }
}
