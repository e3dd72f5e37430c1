//! GPU rendering support.
//!
//! Renderers own their GPU resources (pipelines, buffers) and record into the
//! [`RenderTarget`] handed out by `FrameCtx::render`. Shader programs are
//! compiled and linked up front through [`ShaderProgram`].

mod ctx;
pub mod shader;

pub use ctx::{RenderCtx, RenderTarget};
pub use shader::{ShaderError, ShaderProgram, ShaderStage};

