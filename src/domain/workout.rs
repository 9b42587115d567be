// Workout session domain model - Owns a tracker and records finished sets
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::rep::AngleSample;
use crate::domain::settings::TrackerSettings;
use crate::domain::tracker::{RepetitionTracker, SampleOutcome, SetSummary, TrackerStatus};

pub const DEFAULT_EXERCISE: &str = "Hammer Curls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arm {
    Left,
    Right,
}

impl Arm {
    pub fn other(&self) -> Arm {
        match self {
            Arm::Left => Arm::Right,
            Arm::Right => Arm::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Active,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),
    #[error("session {0} is already closed")]
    Closed(String),
}

/// One finished set as it is stored with the workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    pub set_number: u32,
    pub arm: Arm,
    pub reps: u32,
    pub average_form_score: f64,
    pub duration: f64,
    #[serde(default)]
    pub form_issues: Vec<String>,
    #[serde(default)]
    pub rep_scores: Vec<f64>,
    pub timestamp: DateTime<Utc>,
}

impl SetRecord {
    pub fn from_summary(summary: &SetSummary, arm: Arm, timestamp: DateTime<Utc>) -> Self {
        Self {
            set_number: summary.set_number,
            arm,
            reps: summary.rep_count(),
            average_form_score: summary.average_score,
            duration: summary.duration,
            form_issues: summary.issues.iter().map(|i| i.label().to_string()).collect(),
            rep_scores: summary.rep_scores(),
            timestamp,
        }
    }
}

/// Workout document keyed by user id and workout id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    #[serde(rename = "UserId")]
    pub user_id: String,
    pub workout_id: String,
    pub exercise_type: String,
    pub session_date: DateTime<Utc>,
    pub total_reps: u32,
    pub total_duration: f64,
    pub average_form_score: f64,
    #[serde(default)]
    pub completed_set_pairs: u32,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub session_id: String,
    pub user_id: String,
    pub exercise_type: String,
    pub state: SessionState,
    pub arm: Arm,
    pub completed_set_pairs: u32,
    pub recorded_sets: usize,
    pub tracker: TrackerStatus,
}

pub struct WorkoutSession {
    id: String,
    user_id: String,
    exercise_type: String,
    session_date: DateTime<Utc>,
    arm: Arm,
    completed_set_pairs: u32,
    sets: Vec<SetRecord>,
    tracker: RepetitionTracker,
    record: Option<WorkoutRecord>,
    last_activity: DateTime<Utc>,
}

impl WorkoutSession {
    pub fn new(
        id: String,
        user_id: String,
        exercise_type: Option<String>,
        settings: TrackerSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            exercise_type: exercise_type
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EXERCISE.to_string()),
            session_date: now,
            arm: Arm::Left,
            completed_set_pairs: 0,
            sets: Vec::new(),
            tracker: RepetitionTracker::new(settings),
            record: None,
            last_activity: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sets(&self) -> &[SetRecord] {
        &self.sets
    }

    /// Time since the last sample, set change or close
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_activity
    }

    pub fn state(&self) -> SessionState {
        if self.record.is_some() {
            SessionState::Closed
        } else {
            SessionState::Active
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.clone(),
            user_id: self.user_id.clone(),
            exercise_type: self.exercise_type.clone(),
            state: self.state(),
            arm: self.arm,
            completed_set_pairs: self.completed_set_pairs,
            recorded_sets: self.sets.len(),
            tracker: self.tracker.status(),
        }
    }

    pub fn ingest(
        &mut self,
        sample: AngleSample,
        now: DateTime<Utc>,
    ) -> Result<SampleOutcome, SessionError> {
        self.ensure_active()?;
        self.last_activity = now;

        let outcome = self.tracker.update(sample);
        if let SampleOutcome::RepCompleted(completion) = &outcome {
            if let Some(summary) = &completion.closed_set {
                self.record_set(summary, now);
            }
        }
        Ok(outcome)
    }

    pub fn abandon_rep(&mut self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        self.ensure_active()?;
        self.last_activity = now;
        Ok(self.tracker.abandon_rep())
    }

    /// Ends the current arm's set and moves to the other arm
    pub fn finish_set(&mut self, now: DateTime<Utc>) -> Result<Option<SetRecord>, SessionError> {
        self.ensure_active()?;
        self.last_activity = now;

        let record = self
            .tracker
            .finish_set()
            .map(|summary| self.record_set(&summary, now));

        if self.arm == Arm::Right {
            self.completed_set_pairs += 1;
        }
        self.arm = self.arm.other();
        self.tracker.reset(true);

        tracing::debug!(
            "Session {} switched to {:?} arm, {} set pairs done",
            self.id,
            self.arm,
            self.completed_set_pairs
        );
        Ok(record)
    }

    /// Closing twice hands back the same record
    pub fn close(&mut self, now: DateTime<Utc>) -> WorkoutRecord {
        self.last_activity = now;
        if let Some(record) = &self.record {
            return record.clone();
        }

        if let Some(summary) = self.tracker.finish_set() {
            self.record_set(&summary, now);
        }

        let total_reps = self.sets.iter().map(|s| s.reps).sum();
        let total_duration = self.sets.iter().map(|s| s.duration).sum();
        let average_form_score = if self.sets.is_empty() {
            0.0
        } else {
            self.sets.iter().map(|s| s.average_form_score).sum::<f64>() / self.sets.len() as f64
        };

        let record = WorkoutRecord {
            user_id: self.user_id.clone(),
            workout_id: format!("{}-{}", self.user_id, now.timestamp_millis()),
            exercise_type: self.exercise_type.clone(),
            session_date: self.session_date,
            total_reps,
            total_duration,
            average_form_score,
            completed_set_pairs: self.completed_set_pairs,
            sets: self.sets.clone(),
        };

        tracing::info!(
            "Session {} closed: {} sets, {} reps, average score {:.1}",
            self.id,
            record.sets.len(),
            record.total_reps,
            record.average_form_score
        );

        self.record = Some(record.clone());
        record
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.state() {
            SessionState::Active => Ok(()),
            SessionState::Closed => Err(SessionError::Closed(self.id.clone())),
        }
    }

    fn record_set(&mut self, summary: &SetSummary, now: DateTime<Utc>) -> SetRecord {
        let record = SetRecord::from_summary(summary, self.arm, now);
        self.sets.push(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap()
    }

    fn session(settings: TrackerSettings) -> WorkoutSession {
        WorkoutSession::new("s1".into(), "user-1".into(), None, settings, now())
    }

    /// One clean rep at 10 fps starting at `start`, returns the next free timestamp
    fn perform_rep(session: &mut WorkoutSession, start: f64) -> f64 {
        let mut angles = vec![160.0; 3];
        angles.extend((1..=14).map(|i| 160.0 - 5.0 * i as f64));
        angles.extend([90.0; 15]);
        angles.extend((1..=14).map(|i| 90.0 + 5.0 * i as f64));

        let mut t = start;
        for angle in angles {
            session.ingest(AngleSample::new(angle, t), now()).unwrap();
            t += 0.1;
        }
        t
    }

    #[test]
    fn test_defaults_to_hammer_curls_on_left_arm() {
        let session = session(TrackerSettings::default());
        let status = session.status();
        assert_eq!(status.exercise_type, DEFAULT_EXERCISE);
        assert_eq!(status.arm, Arm::Left);
        assert_eq!(status.state, SessionState::Active);
        assert_eq!(status.tracker.set_number, 1);
    }

    #[test]
    fn test_finish_set_alternates_arms_and_counts_pairs() {
        let mut session = session(TrackerSettings::default());

        let t = perform_rep(&mut session, 0.0);
        let left = session.finish_set(now()).unwrap().unwrap();
        assert_eq!(left.arm, Arm::Left);
        assert_eq!(left.reps, 1);

        let status = session.status();
        assert_eq!(status.arm, Arm::Right);
        assert!(status.tracker.feedback.starts_with("Set 1 complete!"));
        assert_eq!(status.tracker.rep_count, 0);

        perform_rep(&mut session, t);
        let right = session.finish_set(now()).unwrap().unwrap();
        assert_eq!(right.arm, Arm::Right);
        assert_eq!(right.set_number, 2);
        assert_eq!(session.status().arm, Arm::Left);
        assert_eq!(session.status().completed_set_pairs, 1);
    }

    #[test]
    fn test_auto_closed_sets_are_recorded() {
        let settings = TrackerSettings {
            max_reps_per_set: 1,
            ..TrackerSettings::default()
        };
        let mut session = session(settings);

        perform_rep(&mut session, 0.0);

        assert_eq!(session.sets().len(), 1);
        assert_eq!(session.sets()[0].reps, 1);
        assert_eq!(session.status().tracker.set_number, 2);
    }

    #[test]
    fn test_close_builds_record_once() {
        let mut session = session(TrackerSettings::default());
        perform_rep(&mut session, 0.0);

        let record = session.close(now());
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.workout_id, format!("user-1-{}", now().timestamp_millis()));
        assert_eq!(record.total_reps, 1);
        assert_eq!(record.sets.len(), 1);
        assert!(record.average_form_score > 90.0);
        assert_eq!(session.state(), SessionState::Closed);

        let later = now() + Duration::seconds(30);
        assert_eq!(session.close(later), record);
        assert_eq!(
            session.ingest(AngleSample::new(150.0, 100.0), now()),
            Err(SessionError::Closed("s1".into()))
        );
    }

    #[test]
    fn test_activity_resets_idle_time() {
        let mut session = session(TrackerSettings::default());
        let later = now() + Duration::minutes(10);
        assert_eq!(session.idle_for(later), Duration::minutes(10));

        session.abandon_rep(later).unwrap();
        assert_eq!(session.idle_for(later), Duration::zero());
    }

    #[test]
    fn test_empty_session_averages_zero() {
        let mut session = session(TrackerSettings::default());
        let record = session.close(now());
        assert_eq!(record.total_reps, 0);
        assert_eq!(record.average_form_score, 0.0);
        assert!(record.sets.is_empty());
    }

    #[test]
    fn test_record_uses_stored_field_names() {
        let mut session = session(TrackerSettings::default());
        perform_rep(&mut session, 0.0);
        let record = session.close(now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["UserId"], "user-1");
        assert_eq!(json["exerciseType"], "Hammer Curls");
        assert_eq!(json["sets"][0]["arm"], "Left");
        assert!(json["sets"][0]["repScores"].is_array());

        let parsed: WorkoutRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }
}
