// Repository trait for user profiles
use crate::domain::profile::UserProfile;
use async_trait::async_trait;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// None when the user has no profile yet
    async fn get_profile(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>>;

    /// Create or replace, returns the profile as stored
    async fn put_profile(&self, profile: &UserProfile) -> anyhow::Result<UserProfile>;
}
