//! sea-orm entities for the dispatch service's own tables.
//!
//! Campaigns and contacts live in the external content store; only
//! engagement tracking and the durable job queue are persisted here.

pub mod campaign_counters;
pub mod dispatch_jobs;
pub mod tracking_events;
pub mod tracking_uniques;
