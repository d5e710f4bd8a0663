pub mod batch;
pub mod dispatch;
pub mod resolve;
pub mod summary;
pub mod track;
