// Workout and profile API repository implementation
use crate::application::profile_repository::ProfileRepository;
use crate::application::workout_repository::WorkoutRepository;
use crate::domain::profile::UserProfile;
use crate::domain::workout::WorkoutRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct ApiRepository {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveResponse {
    #[serde(default)]
    message: Option<String>,
    workout_id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    workouts: Vec<WorkoutRecord>,
    #[serde(default)]
    count: Option<usize>,
}

impl ApiRepository {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn build_workouts_url(&self, user_id: &str) -> String {
        format!("{}/workouts/{}", self.base_url, urlencoding::encode(user_id))
    }

    fn build_profile_url(&self, user_id: &str) -> String {
        format!("{}/profiles/{}", self.base_url, urlencoding::encode(user_id))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl WorkoutRepository for ApiRepository {
    async fn save_workout(&self, record: &WorkoutRecord) -> Result<String> {
        let url = self.build_workouts_url(&record.user_id);
        tracing::debug!("Posting workout {} to {}", record.workout_id, url);

        let response = self
            .authorize(self.client.post(&url))
            .header("Accept", "application/json")
            .json(record)
            .send()
            .await
            .context("Failed to send workout to API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Workout API rejected {}: {}", record.workout_id, status);
            anyhow::bail!("Workout API save failed with status {}: {}", status, body);
        }

        let saved = response
            .json::<SaveResponse>()
            .await
            .context("Failed to parse workout API response")?;

        if let Some(message) = &saved.message {
            tracing::debug!("Workout API: {}", message);
        }
        Ok(saved.workout_id)
    }

    async fn list_workouts(&self, user_id: &str) -> Result<Vec<WorkoutRecord>> {
        let url = self.build_workouts_url(user_id);

        let response = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to request workouts from API")?;

        // The API answers 404 for users without workouts
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Workout API query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<ListResponse>()
            .await
            .context("Failed to parse workout list")?;

        if let Some(count) = data.count {
            if count != data.workouts.len() {
                tracing::warn!(
                    "Workout API reported {} workouts for {} but sent {}",
                    count,
                    user_id,
                    data.workouts.len()
                );
            }
        }
        Ok(data.workouts)
    }
}

#[async_trait]
impl ProfileRepository for ApiRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let url = self.build_profile_url(user_id);

        let response = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to request profile from API")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Profile API query failed with status {}: {}", status, body);
        }

        let profile = response
            .json::<UserProfile>()
            .await
            .context("Failed to parse profile")?;
        Ok(Some(profile))
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<UserProfile> {
        let url = self.build_profile_url(&profile.user_id);
        tracing::debug!("Putting profile for {} to {}", profile.user_id, url);

        let response = self
            .authorize(self.client.put(&url))
            .header("Accept", "application/json")
            .json(profile)
            .send()
            .await
            .context("Failed to send profile to API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Profile API update failed with status {}: {}", status, body);
        }

        response
            .json::<UserProfile>()
            .await
            .context("Failed to parse stored profile")
    }
}
