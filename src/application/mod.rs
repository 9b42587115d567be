// Application layer - Use cases over the domain and the stores
pub mod history_service;
pub mod profile_repository;
pub mod profile_service;
pub mod session_service;
pub mod workout_repository;
