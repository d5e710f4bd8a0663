//! Pure content transforms: personalization and tracking instrumentation.
//! No I/O, no clock — identical inputs always produce identical output.

pub mod personalize;
pub mod tracking;
