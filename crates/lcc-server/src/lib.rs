//! Live Chess Cloud capture server library.
//!
//! Holds the pieces of the capture server that are useful on their own,
//! currently the request timing middleware.

pub mod middleware;
