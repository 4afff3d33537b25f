//! Pure decision logic behind the chat and mood endpoints.
//!
//! Nothing here touches the database or the network; every function is a
//! plain computation over its arguments.

pub mod classifier;
pub mod sentiment;
pub mod streak;
