// Repetition tracker - Rep-cycle state machine, scoring and set aggregation
use serde::Serialize;

use crate::domain::feedback::{self, CycleVerdict};
use crate::domain::rep::{AngleSample, CompletedRep, FormIssue, RepMetrics, SampleRejection};
use crate::domain::scoring::score_rep;
use crate::domain::settings::TrackerSettings;

/// Speeds below this are treated as jitter rather than slow movement
const SPEED_NOISE_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RepPhase {
    Idle,
    InProgress,
    Holding,
}

/// A set closed either at the rep target or by the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSummary {
    pub set_number: u32,
    pub reps: Vec<CompletedRep>,
    pub average_score: f64,
    pub duration: f64,
    /// Distinct issues across all reps of the set
    pub issues: Vec<FormIssue>,
}

impl SetSummary {
    pub fn rep_count(&self) -> u32 {
        self.reps.len() as u32
    }

    pub fn rep_scores(&self) -> Vec<f64> {
        self.reps.iter().map(|r| r.score).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepCompletion {
    pub rep: CompletedRep,
    pub closed_set: Option<SetSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Rejected(SampleRejection),
    Tracked(RepPhase),
    RepCompleted(RepCompletion),
}

/// Read-only snapshot for displays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStatus {
    pub phase: RepPhase,
    pub current_angle: Option<f64>,
    pub rep_count: u32,
    pub max_reps_per_set: u32,
    pub set_number: u32,
    pub feedback: String,
    pub rep_scores: Vec<f64>,
    pub average_score: f64,
    /// Seconds held in the peak band by the rep in flight
    pub hold_time: f64,
    pub last_rep: Option<CompletedRep>,
}

pub struct RepetitionTracker {
    settings: TrackerSettings,
    phase: RepPhase,
    metrics: Option<RepMetrics>,
    last_sample: Option<AngleSample>,
    set_number: u32,
    set_started_at: Option<f64>,
    reps: Vec<CompletedRep>,
    feedback: String,
    last_rep: Option<CompletedRep>,
}

impl RepetitionTracker {
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            settings,
            phase: RepPhase::Idle,
            metrics: None,
            last_sample: None,
            set_number: 1,
            set_started_at: None,
            reps: Vec::new(),
            feedback: feedback::READY.to_string(),
            last_rep: None,
        }
    }

    pub fn phase(&self) -> RepPhase {
        self.phase
    }

    pub fn current_angle(&self) -> Option<f64> {
        self.last_sample.map(|s| s.angle_degrees)
    }

    pub fn rep_count(&self) -> u32 {
        self.reps.len() as u32
    }

    pub fn set_number(&self) -> u32 {
        self.set_number
    }

    pub fn rep_scores(&self) -> Vec<f64> {
        self.reps.iter().map(|r| r.score).collect()
    }

    pub fn average_score(&self) -> f64 {
        average(&self.reps)
    }

    /// Always describes the last finished cycle, never the one in flight
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn in_flight(&self) -> Option<&RepMetrics> {
        self.metrics.as_ref()
    }

    pub fn status(&self) -> TrackerStatus {
        TrackerStatus {
            phase: self.phase(),
            current_angle: self.current_angle(),
            rep_count: self.rep_count(),
            max_reps_per_set: self.settings.max_reps_per_set,
            set_number: self.set_number(),
            feedback: self.feedback().to_string(),
            rep_scores: self.rep_scores(),
            average_score: self.average_score(),
            hold_time: self.in_flight().map(|m| m.hold_time).unwrap_or(0.0),
            last_rep: self.last_rep.clone(),
        }
    }

    pub fn update(&mut self, sample: AngleSample) -> SampleOutcome {
        if let Err(rejection) = self.validate(&sample) {
            tracing::debug!("Rejected sample {:?}: {}", sample, rejection);
            return SampleOutcome::Rejected(rejection);
        }

        let previous = self.last_sample.replace(sample);
        if self.set_started_at.is_none() {
            self.set_started_at = Some(sample.timestamp);
        }

        let motion = previous.map(|prev| {
            let dt = sample.timestamp - prev.timestamp;
            ((sample.angle_degrees - prev.angle_degrees).abs() / dt, dt)
        });

        match self.phase {
            RepPhase::Idle => {
                if self.settings.start_band.contains(sample.angle_degrees) {
                    self.metrics = Some(RepMetrics::begin(&sample));
                    self.phase = RepPhase::InProgress;
                    tracing::debug!("Cycle started at {:.1}°", sample.angle_degrees);
                }
                SampleOutcome::Tracked(self.phase)
            }
            RepPhase::InProgress | RepPhase::Holding => self.advance(sample, motion),
        }
    }

    /// Drops the rep in flight without scoring it, returns whether there was one
    pub fn abandon_rep(&mut self) -> bool {
        let abandoned = self.metrics.take().is_some();
        self.phase = RepPhase::Idle;
        if abandoned {
            tracing::debug!("Abandoned rep in set {}", self.set_number);
        }
        abandoned
    }

    /// Closes the open set early; an empty set is left open
    pub fn finish_set(&mut self) -> Option<SetSummary> {
        self.abandon_rep();
        if self.reps.is_empty() {
            return None;
        }

        let ended_at = self
            .last_sample
            .map(|s| s.timestamp)
            .or(self.set_started_at)
            .unwrap_or(0.0);
        let summary = self.close_set(ended_at);
        self.feedback = feedback::set_complete(summary.set_number, summary.average_score);
        Some(summary)
    }

    /// Clears everything in flight. Between arms the set number, last rep and
    /// feedback carry over; a full reset starts again from set 1.
    pub fn reset(&mut self, preserve_set_number: bool) {
        self.phase = RepPhase::Idle;
        self.metrics = None;
        self.last_sample = None;
        self.set_started_at = None;
        self.reps.clear();
        if !preserve_set_number {
            self.set_number = 1;
            self.last_rep = None;
            self.feedback = feedback::READY.to_string();
        }
    }

    fn validate(&self, sample: &AngleSample) -> Result<(), SampleRejection> {
        if !sample.angle_degrees.is_finite() {
            return Err(SampleRejection::NonFiniteAngle);
        }
        if !(0.0..=180.0).contains(&sample.angle_degrees) {
            return Err(SampleRejection::AngleOutOfRange(sample.angle_degrees));
        }
        if !sample.timestamp.is_finite() {
            return Err(SampleRejection::NonFiniteTimestamp);
        }
        if let Some(prev) = self.last_sample {
            if sample.timestamp <= prev.timestamp {
                return Err(SampleRejection::NonIncreasingTimestamp {
                    previous: prev.timestamp,
                    current: sample.timestamp,
                });
            }
        }
        Ok(())
    }

    fn advance(&mut self, sample: AngleSample, motion: Option<(f64, f64)>) -> SampleOutcome {
        let Some(mut metrics) = self.metrics.take() else {
            self.phase = RepPhase::Idle;
            return SampleOutcome::Tracked(self.phase);
        };

        let angle = sample.angle_degrees;
        let in_start = self.settings.start_band.contains(angle);
        let in_peak = self.settings.peak_band.contains(angle);

        // Resting in the start band keeps the cycle anchored to the latest sample
        if !metrics.departed {
            if in_start {
                metrics.start_angle = metrics.start_angle.max(angle);
                metrics.peak_angle = metrics.peak_angle.min(angle);
                metrics.started_at = sample.timestamp;
                self.metrics = Some(metrics);
                return SampleOutcome::Tracked(self.phase);
            }
            metrics.departed = true;
        }

        metrics.peak_angle = metrics.peak_angle.min(angle);
        metrics.duration = sample.timestamp - metrics.started_at;

        let was_holding = self.phase == RepPhase::Holding;
        if let Some((speed, _)) = motion {
            if !(was_holding && in_peak) {
                metrics.speeds.push(speed);
                self.check_speed(&mut metrics, speed);
            }
        }
        if angle < self.settings.peak_band.min {
            metrics.flag(FormIssue::ExcessiveSwing);
        }

        if in_peak {
            if was_holding {
                metrics.hold_time += motion.map(|(_, dt)| dt).unwrap_or(0.0);
            } else {
                self.phase = RepPhase::Holding;
                metrics.hold_time = 0.0;
            }
            if metrics.hold_time >= self.settings.rep_hold_time {
                metrics.hold_satisfied = true;
            }
            self.metrics = Some(metrics);
            return SampleOutcome::Tracked(self.phase);
        }

        if was_holding && !metrics.hold_satisfied {
            tracing::debug!(
                "Left peak band after {:.2}s, hold not satisfied",
                metrics.hold_time
            );
        }
        self.phase = RepPhase::InProgress;

        if !in_start {
            self.metrics = Some(metrics);
            return SampleOutcome::Tracked(self.phase);
        }

        // Back in the start band: the cycle ends here one way or another
        self.phase = RepPhase::Idle;
        let verdict = if !metrics.hold_satisfied {
            if metrics.peak_angle <= self.settings.peak_band.max {
                CycleVerdict::HoldTooShort {
                    held: metrics.hold_time,
                }
            } else {
                CycleVerdict::Shallow {
                    peak_angle: metrics.peak_angle,
                }
            }
        } else if metrics.duration < self.settings.min_rep_duration {
            CycleVerdict::TooQuick {
                duration: metrics.duration,
            }
        } else {
            return SampleOutcome::RepCompleted(self.complete_rep(metrics, sample.timestamp));
        };

        tracing::debug!("Cycle discarded: {:?}", verdict);
        self.feedback = feedback::describe(verdict, &self.settings);
        SampleOutcome::Tracked(self.phase)
    }

    fn check_speed(&self, metrics: &mut RepMetrics, speed: f64) {
        if speed > self.settings.max_speed {
            metrics.flag(FormIssue::MovementTooFast);
        } else if speed < self.settings.min_speed && speed > SPEED_NOISE_FLOOR {
            metrics.flag(FormIssue::MovementTooSlow);
        }
    }

    fn complete_rep(&mut self, mut metrics: RepMetrics, now: f64) -> RepCompletion {
        if metrics.range_of_motion() < self.settings.min_range_of_motion {
            metrics.flag(FormIssue::IncompleteRangeOfMotion);
        }

        let breakdown = score_rep(&metrics, &self.settings);
        let rep = CompletedRep {
            sequence: self.rep_count() + 1,
            score: breakdown.total,
            issues: metrics.issues,
            duration: metrics.duration,
            start_angle: metrics.start_angle,
            peak_angle: metrics.peak_angle,
        };

        tracing::info!(
            "Rep {} of set {} completed: score {:.1}, peak {:.1}°, {:.2}s",
            rep.sequence,
            self.set_number,
            rep.score,
            rep.peak_angle,
            rep.duration
        );

        self.feedback = feedback::describe(CycleVerdict::Completed(&rep), &self.settings);
        self.reps.push(rep.clone());
        self.last_rep = Some(rep.clone());

        let closed_set = if self.settings.max_reps_per_set > 0
            && self.rep_count() >= self.settings.max_reps_per_set
        {
            let summary = self.close_set(now);
            self.feedback = feedback::set_complete(summary.set_number, summary.average_score);
            Some(summary)
        } else {
            None
        };

        RepCompletion { rep, closed_set }
    }

    fn close_set(&mut self, ended_at: f64) -> SetSummary {
        let reps = std::mem::take(&mut self.reps);
        let started_at = self.set_started_at.take().unwrap_or(ended_at);

        let mut issues: Vec<FormIssue> = Vec::new();
        for issue in reps.iter().flat_map(|r| r.issues.iter()) {
            if !issues.contains(issue) {
                issues.push(*issue);
            }
        }

        let summary = SetSummary {
            set_number: self.set_number,
            average_score: average(&reps),
            duration: (ended_at - started_at).max(0.0),
            issues,
            reps,
        };

        tracing::info!(
            "Set {} closed with {} reps, average score {:.1}",
            summary.set_number,
            summary.rep_count(),
            summary.average_score
        );

        self.set_number += 1;
        summary
    }
}

fn average(reps: &[CompletedRep]) -> f64 {
    if reps.is_empty() {
        return 0.0;
    }
    reps.iter().map(|r| r.score).sum::<f64>() / reps.len() as f64
}
