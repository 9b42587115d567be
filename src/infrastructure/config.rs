use crate::domain::pose::PoseSettings;
use crate::domain::settings::TrackerSettings;
use serde::Deserialize;

const ENV_PREFIX: &str = "CURL_COACH";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub tracker: TrackerSettings,
    pub pose: PoseSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Sessions without activity for this long are dropped
    pub session_ttl_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            session_ttl_secs: 1800,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Api,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StoreSettings {
    pub kind: StoreKind,
    pub base_url: Option<String>,
    pub token: Option<String>,
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.store.kind == StoreKind::Api && self.store.base_url.is_none() {
            anyhow::bail!("store.base_url is required when store.kind = \"api\"");
        }

        if self.server.session_ttl_secs == 0 {
            anyhow::bail!("server.session_ttl_secs must be positive");
        }

        let tracker = &self.tracker;
        if tracker.start_band.min > tracker.start_band.max
            || tracker.peak_band.min > tracker.peak_band.max
        {
            anyhow::bail!("tracker bands must have min <= max");
        }
        if tracker.peak_band.max >= tracker.start_band.min {
            anyhow::bail!(
                "tracker.peak_band ({}..{}) must lie below tracker.start_band ({}..{})",
                tracker.peak_band.min,
                tracker.peak_band.max,
                tracker.start_band.min,
                tracker.start_band.max
            );
        }
        if tracker.max_reps_per_set == 0 || tracker.min_reps_per_set > tracker.max_reps_per_set {
            anyhow::bail!("tracker.max_reps_per_set must be positive and >= min_reps_per_set");
        }
        Ok(())
    }
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/app")
}

/// File settings first, then `CURL_COACH__SECTION__KEY` overrides
pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_app_config_from("config/does-not-exist").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_ttl_secs, 1800);
        assert_eq!(config.store.kind, StoreKind::Memory);
        assert_eq!(config.tracker.max_reps_per_set, 12);
        assert_eq!(config.pose.min_joint_confidence, 0.5);
    }

    #[test]
    fn test_file_overrides_selected_settings() {
        let dir = std::env::temp_dir().join(format!("curl-coach-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("app.toml"),
            r#"
[server]
port = 9090
session_ttl_secs = 600

[store]
kind = "api"
base_url = "https://api.example.com/prod"

[tracker]
min_rep_duration = 2.0

[tracker.peak_band]
min = 40.0
max = 100.0
"#,
        )
        .unwrap();

        let path = dir.join("app");
        let config = load_app_config_from(path.to_str().unwrap()).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.session_ttl_secs, 600);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.kind, StoreKind::Api);
        assert_eq!(config.tracker.min_rep_duration, 2.0);
        assert_eq!(config.tracker.peak_band.max, 100.0);
        assert_eq!(config.tracker.ideal_peak_angle, 90.0);
    }

    #[test]
    fn test_validate_rejects_overlapping_bands() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.tracker.peak_band.max = 150.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_store_needs_base_url() {
        let mut config = AppConfig::default();
        config.store.kind = StoreKind::Api;
        assert!(config.validate().is_err());
    }
}
