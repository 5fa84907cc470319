//! wgpu plumbing for the alpha-matte renderer.
//!
//! - `context` owns the headless instance/device/queue and adapter profile.
//! - `canvas` is the offscreen drawing surface; it resizes on demand and can
//!   be read back to an `RgbaImage`.
//! - `texture` holds the uploaded video frame and rewrites it in place.
//! - `program` compiles a vertex/fragment pair into a render pipeline and
//!   draws the full-screen quad.
//! - `matte` glues the above into [`MatteRenderer`], one program per
//!   orientation.

mod canvas;
mod context;
mod matte;
mod program;
mod texture;

pub use canvas::Canvas;
pub use context::GpuContext;
pub use matte::MatteRenderer;
pub use program::ShaderProgram;
