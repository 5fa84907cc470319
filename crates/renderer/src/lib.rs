//! Alpha-matte renderer for packed colour + alpha video frames.
//!
//! Source frames carry two sub-images: RGB colour in one half and a grayscale
//! matte in the other. The fragment shaders sample both halves and write
//! `vec4(color.rgb, matte.r)`. The flow is:
//!
//! ```text
//!   frame (RgbaImage)
//!          │ set_texture()
//!          ▼
//!   FrameTexture ──▶ ShaderProgram[orientation] ──▶ Canvas ──▶ read_pixels()
//!                           ▲
//!          render(w, h, orientation)
//! ```
//!
//! [`MatteRenderer`] is the GPU implementation; [`CpuMatte`] renders the same
//! convention on the CPU and doubles as the reference the GPU output is
//! checked against. Both implement [`FrameRenderer`], which is what the
//! playback driver talks to.

mod compile;
mod error;
mod gpu;
pub mod reference;
mod types;

use image::RgbaImage;

pub use compile::{
    check_program, ShaderSources, HORIZONTAL_FRAGMENT_GLSL, SHADER_ASSET_VERSION,
    VERTEX_SHADER_GLSL, VERTICAL_FRAGMENT_GLSL,
};
pub use error::{RenderError, StageKind};
pub use gpu::{Canvas, GpuContext, MatteRenderer, ShaderProgram};
pub use reference::CpuMatte;
pub use types::{AdapterProfile, GpuPowerPreference, Orientation};

/// Uploads frames and draws them with the alpha-extraction shaders.
pub trait FrameRenderer {
    /// Replaces the current frame. Storage is reused while dimensions match.
    fn set_texture(&mut self, frame: &RgbaImage) -> Result<(), RenderError>;

    /// Resizes the drawing surface to `width`x`height` if needed and draws
    /// the current frame using the program for `orientation`.
    fn render(&mut self, width: u32, height: u32, orientation: Orientation)
        -> Result<(), RenderError>;

    /// Copies the drawing surface back to the CPU.
    fn read_pixels(&mut self) -> Result<RgbaImage, RenderError>;
}

impl<T: FrameRenderer + ?Sized> FrameRenderer for Box<T> {
    fn set_texture(&mut self, frame: &RgbaImage) -> Result<(), RenderError> {
        (**self).set_texture(frame)
    }

    fn render(
        &mut self,
        width: u32,
        height: u32,
        orientation: Orientation,
    ) -> Result<(), RenderError> {
        (**self).render(width, height, orientation)
    }

    fn read_pixels(&mut self) -> Result<RgbaImage, RenderError> {
        (**self).read_pixels()
    }
}
