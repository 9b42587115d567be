// Domain layer - Rep tracking, scoring and workout sessions
pub mod feedback;
pub mod pose;
pub mod profile;
pub mod rep;
pub mod scoring;
pub mod settings;
pub mod tracker;
pub mod workout;
