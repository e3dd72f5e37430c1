//! Trilayer engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by the demo binary:
//! window and event loop, wgpu device and surface, keyboard input, frame
//! timing, logging, and the shader pipeline.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;
