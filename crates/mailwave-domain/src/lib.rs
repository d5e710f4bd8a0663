//! Domain types shared across Mailwave services.
//!
//! This crate contains only pure types and transforms with no framework
//! dependencies, so any layer of any service may depend on it.

pub mod campaign;
pub mod contact;
pub mod flatten;
pub mod tracking;
