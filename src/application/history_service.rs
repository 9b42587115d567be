// History service - Use case for reviewing stored workouts
use crate::application::workout_repository::WorkoutRepository;
use crate::domain::workout::WorkoutRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub workout_count: usize,
    pub total_reps: u32,
    pub average_form_score: f64,
}

impl HistorySummary {
    pub fn from_workouts(workouts: &[WorkoutRecord]) -> Self {
        let average_form_score = if workouts.is_empty() {
            0.0
        } else {
            workouts.iter().map(|w| w.average_form_score).sum::<f64>() / workouts.len() as f64
        };

        Self {
            workout_count: workouts.len(),
            total_reps: workouts.iter().map(|w| w.total_reps).sum(),
            average_form_score,
        }
    }
}

/// Inclusive window on the session date
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// A window needs both ends; one open end means no filter
    pub fn from_bounds(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Option<Self> {
        Some(Self { from: from?, to: to? })
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        date >= self.from && date <= self.to
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutHistory {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    pub workouts: Vec<WorkoutRecord>,
    pub summary: HistorySummary,
}

#[derive(Clone)]
pub struct HistoryService {
    repository: Arc<dyn WorkoutRepository>,
}

impl HistoryService {
    pub fn new(repository: Arc<dyn WorkoutRepository>) -> Self {
        Self { repository }
    }

    /// Newest session first, summary over the returned workouts only
    pub async fn history(
        &self,
        user_id: &str,
        range: Option<DateRange>,
    ) -> anyhow::Result<WorkoutHistory> {
        let mut workouts = self.repository.list_workouts(user_id).await?;
        if let Some(range) = &range {
            workouts.retain(|w| range.contains(w.session_date));
        }
        workouts.sort_by(|a, b| b.session_date.cmp(&a.session_date));

        tracing::debug!("Loaded {} workouts for user {}", workouts.len(), user_id);
        Ok(WorkoutHistory {
            user_id: user_id.to_string(),
            range,
            summary: HistorySummary::from_workouts(&workouts),
            workouts,
        })
    }
}
