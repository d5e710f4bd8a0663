//! Outbound adapters: HTTP collaborators and the service-owned database.

pub mod content_store;
pub mod db;
pub mod directory;
pub mod transport;

pub use content_store::HttpCampaignStore;
pub use db::DbTrackingStore;
pub use directory::{HttpDirectory, HttpTokenIssuer};
pub use transport::HttpMailTransport;
