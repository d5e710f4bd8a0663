//! Durable DB-backed job queue.
//!
//! Jobs are rows in `dispatch_jobs`; workers claim them with an optimistic
//! conditional update, so multiple service instances can share one queue
//! without coordination.

pub mod job;
pub mod worker;

pub use job::{JobHandler, JobOptions, JobQueue, JobRegistry};
pub use worker::WorkerPool;
