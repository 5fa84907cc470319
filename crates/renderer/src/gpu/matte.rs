use image::RgbaImage;

use crate::compile::ShaderSources;
use crate::error::RenderError;
use crate::reference::validate_split;
use crate::types::{AdapterProfile, Orientation};
use crate::FrameRenderer;

use super::canvas::Canvas;
use super::context::GpuContext;
use super::program::ShaderProgram;
use super::texture::FrameTexture;

/// Owns the GPU context, the canvas, the frame texture and one program per
/// orientation. Dropping it releases every GPU object.
pub struct MatteRenderer {
    gpu: GpuContext,
    canvas: Canvas,
    programs: [ShaderProgram; 2],
    texture: Option<FrameTexture>,
    generation: u64,
}

impl MatteRenderer {
    /// Builds both orientation programs against `canvas`.
    ///
    /// `canvas` is `None` while the host has not provided a drawing surface;
    /// that case reports [`RenderError::MissingSurface`] so callers can retry
    /// once it is mounted.
    pub fn new(
        gpu: GpuContext,
        canvas: Option<Canvas>,
        sources: &ShaderSources,
    ) -> Result<Self, RenderError> {
        let canvas = canvas.ok_or(RenderError::MissingSurface)?;
        let horizontal = ShaderProgram::new(
            &gpu,
            &sources.vertex,
            sources.fragment(Orientation::Horizontal),
        )?;
        let vertical = ShaderProgram::new(
            &gpu,
            &sources.vertex,
            sources.fragment(Orientation::Vertical),
        )?;
        tracing::debug!(
            adapter = %gpu.adapter_profile().name,
            canvas = ?canvas.size(),
            "matte renderer ready"
        );
        Ok(Self {
            gpu,
            canvas,
            programs: [horizontal, vertical],
            texture: None,
            generation: 0,
        })
    }

    pub fn adapter_profile(&self) -> &AdapterProfile {
        self.gpu.adapter_profile()
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas.size()
    }
}

impl FrameRenderer for MatteRenderer {
    fn set_texture(&mut self, frame: &RgbaImage) -> Result<(), RenderError> {
        let (width, height) = frame.dimensions();
        self.gpu.check_dimensions(width, height)?;

        let reusable = matches!(&self.texture, Some(texture) if texture.size() == (width, height));
        if !reusable {
            self.generation += 1;
            tracing::debug!(width, height, "allocating frame texture");
            self.texture = Some(FrameTexture::new(&self.gpu, width, height, self.generation));
        }
        if let Some(texture) = self.texture.as_ref() {
            texture.write(&self.gpu, frame);
        }
        Ok(())
    }

    fn render(&mut self, width: u32, height: u32, orientation: Orientation) -> Result<(), RenderError> {
        let Some(texture) = self.texture.as_ref() else {
            return Err(RenderError::InvalidFrame(
                "render called before a frame was uploaded".into(),
            ));
        };
        let (frame_width, frame_height) = texture.size();
        validate_split(frame_width, frame_height, orientation)?;

        self.canvas.resize_if_changed(&self.gpu, width, height)?;

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("matte encoder"),
            });
        self.programs[orientation.index()].draw(&self.gpu, &mut encoder, self.canvas.view(), texture);
        self.gpu.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn read_pixels(&mut self) -> Result<RgbaImage, RenderError> {
        self.canvas.read_pixels(&self.gpu)
    }
}
