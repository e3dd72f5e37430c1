//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the application: lifecycle hooks, the per-frame context, and the startup
//! error taxonomy.

mod app;
mod ctx;
mod error;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
pub use error::InitError;
