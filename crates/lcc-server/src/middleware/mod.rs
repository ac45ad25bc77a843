//! HTTP middleware for the capture server.

mod timing;

pub use timing::{timing_layer, CaptureKind};
