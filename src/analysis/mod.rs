//! Aggregation and ranking over a batch of evaluation records.

pub mod aggregator;
pub mod batch;
pub mod ranker;

pub use aggregator::aggregate;
pub use batch::{load_batch, Batch};
pub use ranker::{rank, top_n};
