//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskState`: lifecycle of a single crawl task (queued, dispatched, fetching, done)
//! - `OriginState`: dispatch slot bookkeeping used by the pacer

mod origin_state;
mod task_state;

// Re-export main types
pub use origin_state::OriginState;
pub use task_state::TaskState;
