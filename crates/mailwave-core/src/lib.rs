//! Shared ambient plumbing for Mailwave services.
//!
//! Tracing bootstrap, health handlers, request-id middleware, serde helpers,
//! and the detached-task drain. No domain logic lives here.

pub mod drain;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
