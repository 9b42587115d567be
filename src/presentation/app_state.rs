// Application state for HTTP handlers
use crate::application::history_service::HistoryService;
use crate::application::profile_service::ProfileService;
use crate::application::session_service::SessionService;

#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub history_service: HistoryService,
    pub profile_service: ProfileService,
}
