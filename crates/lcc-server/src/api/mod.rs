//! API handlers for the capture server.

pub mod captures;
pub mod export;
pub mod session;
