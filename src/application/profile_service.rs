// Profile service - Get-or-create and update of user profiles
use crate::application::profile_repository::ProfileRepository;
use crate::domain::profile::{ProfileUpdate, UserProfile};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    /// First lookup of an unknown user stores an empty profile
    pub async fn get_or_create(&self, user_id: &str) -> anyhow::Result<UserProfile> {
        if let Some(profile) = self.repository.get_profile(user_id).await? {
            return Ok(profile);
        }

        let profile = self
            .repository
            .put_profile(&UserProfile::new(user_id.to_string()))
            .await
            .with_context(|| format!("Failed to create profile for {}", user_id))?;
        tracing::info!("Created profile for user {}", user_id);
        Ok(profile)
    }

    pub async fn update(&self, user_id: &str, update: ProfileUpdate) -> anyhow::Result<UserProfile> {
        update.validate(Utc::now().date_naive())?;

        let mut profile = self.get_or_create(user_id).await?;
        profile.apply(update);

        let stored = self
            .repository
            .put_profile(&profile)
            .await
            .with_context(|| format!("Failed to update profile for {}", user_id))?;
        tracing::debug!("Updated profile for user {}", user_id);
        Ok(stored)
    }
}
