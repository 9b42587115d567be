// Session service - Use cases for live workout sessions
use crate::application::workout_repository::WorkoutRepository;
use crate::domain::pose::{KeypointFrame, PoseSettings};
use crate::domain::rep::{AngleSample, CompletedRep};
use crate::domain::settings::TrackerSettings;
use crate::domain::tracker::SampleOutcome;
use crate::domain::workout::{
    SessionError, SessionState, SessionStatus, SetRecord, WorkoutRecord, WorkoutSession,
};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

type SharedSession = Arc<Mutex<WorkoutSession>>;

const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedSample {
    pub index: usize,
    pub reason: String,
}

/// What a batch of samples or frames did to a session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: Vec<RejectedSample>,
    /// Frames without a usable elbow angle
    pub dropped_frames: usize,
    pub completed_reps: Vec<CompletedRep>,
    pub closed_sets: Vec<SetRecord>,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransition {
    pub set: Option<SetRecord>,
    pub status: SessionStatus,
}

#[derive(Clone)]
pub struct SessionService {
    repository: Arc<dyn WorkoutRepository>,
    tracker_settings: TrackerSettings,
    pose_settings: PoseSettings,
    sessions: Arc<Mutex<HashMap<String, SharedSession>>>,
    next_id: Arc<AtomicU64>,
    session_ttl: Duration,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn WorkoutRepository>,
        tracker_settings: TrackerSettings,
        pose_settings: PoseSettings,
    ) -> Self {
        Self {
            repository,
            tracker_settings,
            pose_settings,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }

    /// Sessions untouched for longer than `ttl` are dropped
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub async fn start_session(
        &self,
        user_id: &str,
        exercise_type: Option<String>,
    ) -> SessionStatus {
        let now = Utc::now();
        let id = format!(
            "{}-{}",
            now.timestamp_millis(),
            self.next_id.fetch_add(1, Ordering::Relaxed)
        );

        let session = WorkoutSession::new(
            id.clone(),
            user_id.to_string(),
            exercise_type,
            self.tracker_settings.clone(),
            now,
        );
        let status = session.status();

        self.evict_idle(now).await;
        self.sessions
            .lock()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));

        tracing::info!("Started session {} for user {}", id, user_id);
        status
    }

    pub async fn status(&self, session_id: &str) -> anyhow::Result<SessionStatus> {
        let session = self.find(session_id).await?;
        let status = session.lock().await.status();
        Ok(status)
    }

    pub async fn ingest_samples(
        &self,
        session_id: &str,
        samples: &[AngleSample],
    ) -> anyhow::Result<IngestReport> {
        let session = self.find(session_id).await?;
        let mut session = session.lock().await;

        let mut report = Ingest::default();
        for (index, sample) in samples.iter().enumerate() {
            report.apply(&mut session, index, *sample)?;
        }
        Ok(report.finish(&session, 0))
    }

    /// Frames whose joints fall under the confidence gate never reach the tracker
    pub async fn ingest_frames(
        &self,
        session_id: &str,
        frames: &[KeypointFrame],
    ) -> anyhow::Result<IngestReport> {
        let session = self.find(session_id).await?;
        let mut session = session.lock().await;

        let mut report = Ingest::default();
        let mut dropped = 0;
        for (index, frame) in frames.iter().enumerate() {
            match frame.to_sample(&self.pose_settings) {
                Some(sample) => report.apply(&mut session, index, sample)?,
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::debug!("Dropped {} of {} frames for {}", dropped, frames.len(), session_id);
        }
        Ok(report.finish(&session, dropped))
    }

    pub async fn abandon_rep(&self, session_id: &str) -> anyhow::Result<SessionStatus> {
        let session = self.find(session_id).await?;
        let mut session = session.lock().await;
        session.abandon_rep(Utc::now())?;
        Ok(session.status())
    }

    pub async fn finish_set(&self, session_id: &str) -> anyhow::Result<SetTransition> {
        let session = self.find(session_id).await?;
        let mut session = session.lock().await;
        let set = session.finish_set(Utc::now())?;
        Ok(SetTransition {
            set,
            status: session.status(),
        })
    }

    /// Closes and stores the workout; the session is only forgotten once the store accepted it
    pub async fn finish_session(&self, session_id: &str) -> anyhow::Result<WorkoutRecord> {
        let session = self.find(session_id).await?;
        let mut record = session.lock().await.close(Utc::now());

        let workout_id = self
            .repository
            .save_workout(&record)
            .await
            .with_context(|| format!("Failed to store workout for session {}", session_id))?;

        self.sessions.lock().await.remove(session_id);
        tracing::info!(
            "Stored workout {} for user {} ({} reps)",
            workout_id,
            record.user_id,
            record.total_reps
        );

        record.workout_id = workout_id;
        Ok(record)
    }

    /// Drops idle sessions, returns how many went. Sessions busy in a request are skipped.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();

        sessions.retain(|id, session| {
            let Ok(session) = session.try_lock() else {
                return true;
            };
            let idle = session.idle_for(now);
            if idle <= self.session_ttl {
                return true;
            }

            match session.state() {
                SessionState::Active => tracing::info!(
                    "Evicting session {} after {}s idle",
                    id,
                    idle.num_seconds()
                ),
                SessionState::Closed => tracing::warn!(
                    "Evicting closed session {} after {}s idle, its workout was never stored",
                    id,
                    idle.num_seconds()
                ),
            }
            false
        });

        before - sessions.len()
    }

    async fn find(&self, session_id: &str) -> anyhow::Result<SharedSession> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()).into())
    }
}

#[derive(Default)]
struct Ingest {
    accepted: usize,
    rejected: Vec<RejectedSample>,
    completed_reps: Vec<CompletedRep>,
    closed_sets: Vec<SetRecord>,
}

impl Ingest {
    fn apply(
        &mut self,
        session: &mut WorkoutSession,
        index: usize,
        sample: AngleSample,
    ) -> Result<(), SessionError> {
        match session.ingest(sample, Utc::now())? {
            SampleOutcome::Rejected(reason) => {
                tracing::debug!("Rejected sample {} for {}: {}", index, session.id(), reason);
                self.rejected.push(RejectedSample {
                    index,
                    reason: reason.to_string(),
                });
            }
            SampleOutcome::Tracked(_) => self.accepted += 1,
            SampleOutcome::RepCompleted(completion) => {
                self.accepted += 1;
                self.completed_reps.push(completion.rep);
                if completion.closed_set.is_some() {
                    self.closed_sets.extend(session.sets().last().cloned());
                }
            }
        }
        Ok(())
    }

    fn finish(self, session: &WorkoutSession, dropped_frames: usize) -> IngestReport {
        IngestReport {
            accepted: self.accepted,
            rejected: self.rejected,
            dropped_frames,
            completed_reps: self.completed_reps,
            closed_sets: self.closed_sets,
            status: session.status(),
        }
    }
}
