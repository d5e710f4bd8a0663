pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod jobs;
pub mod queue;
pub mod router;
pub mod state;
pub mod usecase;
