//! Dashboard analytics.
//!
//! Pure aggregation over the normalized record set; no state is kept
//! between calls.

pub mod aggregator;

pub use aggregator::*;
