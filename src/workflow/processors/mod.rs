//! Per-item workers. Each one turns a single task into a single [`Outcome`].
//!
//! [`Outcome`]: crate::workflow::types::Outcome

pub mod fetch;
pub mod image;
