//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `EdgeStatus`: How an edge row was produced (resolved, paused, reconciled)
//! - `InProcess`: Ids whose expansion has begun under the current root

mod edge_status;
mod in_process;

// Re-export main types
pub use edge_status::EdgeStatus;
pub use in_process::InProcess;
