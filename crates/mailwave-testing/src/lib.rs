//! Test utilities for Mailwave services.
//!
//! Provides the fixture loader and bearer-auth helpers.
//! Import in `#[cfg(test)]` blocks and `tests/` only — never in production code.

pub mod auth;
pub mod fixture;
