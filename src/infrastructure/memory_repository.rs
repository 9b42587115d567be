// In-memory workout and profile store
use crate::application::profile_repository::ProfileRepository;
use crate::application::workout_repository::WorkoutRepository;
use crate::domain::profile::UserProfile;
use crate::domain::workout::WorkoutRecord;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Workouts and profiles keyed by user id, lost on restart
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    workouts: RwLock<HashMap<String, Vec<WorkoutRecord>>>,
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkoutRepository for InMemoryRepository {
    async fn save_workout(&self, record: &WorkoutRecord) -> Result<String> {
        let mut workouts = self.workouts.write().await;
        let stored = workouts.entry(record.user_id.clone()).or_default();

        match stored.iter_mut().find(|w| w.workout_id == record.workout_id) {
            Some(existing) => *existing = record.clone(),
            None => stored.push(record.clone()),
        }
        Ok(record.workout_id.clone())
    }

    async fn list_workouts(&self, user_id: &str) -> Result<Vec<WorkoutRecord>> {
        let workouts = self.workouts.read().await;
        Ok(workouts.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile.clone());
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn workout(user_id: &str, workout_id: &str, total_reps: u32) -> WorkoutRecord {
        WorkoutRecord {
            user_id: user_id.into(),
            workout_id: workout_id.into(),
            exercise_type: "Hammer Curls".into(),
            session_date: Utc::now(),
            total_reps,
            total_duration: 30.0,
            average_form_score: 75.0,
            completed_set_pairs: 0,
            sets: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_saving_same_workout_twice_replaces_it() {
        let repository = InMemoryRepository::new();
        repository.save_workout(&workout("u1", "u1-1", 5)).await.unwrap();
        let id = repository.save_workout(&workout("u1", "u1-1", 8)).await.unwrap();
        repository.save_workout(&workout("u2", "u2-1", 3)).await.unwrap();

        assert_eq!(id, "u1-1");
        let stored = repository.list_workouts("u1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].total_reps, 8);
    }

    #[tokio::test]
    async fn test_profiles_are_replaced_whole() {
        let repository = InMemoryRepository::new();
        assert_eq!(repository.get_profile("u1").await.unwrap(), None);

        let mut profile = UserProfile::new("u1".into());
        profile.goal_weight = Some(165.0);
        repository.put_profile(&profile).await.unwrap();

        let replacement = UserProfile::new("u1".into());
        repository.put_profile(&replacement).await.unwrap();
        assert_eq!(repository.get_profile("u1").await.unwrap(), Some(replacement));
    }
}
