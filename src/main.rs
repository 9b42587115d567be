// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use chrono::Utc;

use crate::application::history_service::HistoryService;
use crate::application::profile_repository::ProfileRepository;
use crate::application::profile_service::ProfileService;
use crate::application::session_service::SessionService;
use crate::application::workout_repository::WorkoutRepository;
use crate::infrastructure::api_repository::ApiRepository;
use crate::infrastructure::config::{load_app_config, StoreKind, StoreSettings};
use crate::infrastructure::memory_repository::InMemoryRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    abandon_rep, finish_session, finish_set, get_profile, health_check, ingest_frames,
    ingest_samples, session_status, start_session, update_profile, workout_history,
};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Stores {
    workouts: Arc<dyn WorkoutRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

fn build_stores(store: &StoreSettings) -> anyhow::Result<Stores> {
    match store.kind {
        StoreKind::Memory => {
            let repository = Arc::new(InMemoryRepository::new());
            Ok(Stores {
                workouts: repository.clone(),
                profiles: repository,
            })
        }
        StoreKind::Api => {
            let base_url = store
                .base_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("store.base_url is not set"))?;
            let repository = Arc::new(ApiRepository::new(base_url, store.token.clone()));
            Ok(Stores {
                workouts: repository.clone(),
                profiles: repository,
            })
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Create repositories (infrastructure layer)
    let stores = build_stores(&app_config.store)?;
    tracing::info!("Using {:?} workout store", app_config.store.kind);

    // Create services (application layer)
    let session_ttl = chrono::Duration::from_std(Duration::from_secs(app_config.server.session_ttl_secs))?;
    let session_service = SessionService::new(
        stores.workouts.clone(),
        app_config.tracker.clone(),
        app_config.pose.clone(),
    )
    .with_session_ttl(session_ttl);
    let history_service = HistoryService::new(stores.workouts);
    let profile_service = ProfileService::new(stores.profiles);

    // Drop sessions that clients walked away from
    let sweeper = session_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.evict_idle(Utc::now()).await;
        }
    });

    // Create application state
    let state = Arc::new(AppState {
        session_service,
        history_service,
        profile_service,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/sessions", post(start_session))
        .route("/sessions/:id", get(session_status))
        .route("/sessions/:id/samples", post(ingest_samples))
        .route("/sessions/:id/frames", post(ingest_frames))
        .route("/sessions/:id/abandon", post(abandon_rep))
        .route("/sessions/:id/sets/finish", post(finish_set))
        .route("/sessions/:id/finish", post(finish_session))
        .route("/users/:user_id/workouts", get(workout_history))
        .route("/users/:user_id/profile", get(get_profile).put(update_profile))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", app_config.server.host, app_config.server.port).parse()?;
    tracing::info!("Starting curl-coach service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
