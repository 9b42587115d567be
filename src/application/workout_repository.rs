// Repository trait for workout persistence
use crate::domain::workout::WorkoutRecord;
use async_trait::async_trait;

#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    /// Store a finished workout, returns the workout id the store acknowledged
    async fn save_workout(&self, record: &WorkoutRecord) -> anyhow::Result<String>;

    /// All stored workouts for a user, in no particular order
    async fn list_workouts(&self, user_id: &str) -> anyhow::Result<Vec<WorkoutRecord>>;
}
