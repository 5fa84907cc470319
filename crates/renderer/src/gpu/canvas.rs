use image::RgbaImage;

use crate::error::RenderError;

use super::context::GpuContext;

pub(crate) const CANVAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Offscreen drawing surface. Reallocated only when its size changes.
pub struct Canvas {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
}

impl Canvas {
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Result<Self, RenderError> {
        gpu.check_dimensions(width, height)?;
        let (texture, view) = allocate(&gpu.device, width, height);
        Ok(Self {
            texture,
            view,
            size: (width, height),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Returns `true` when the backing texture had to be replaced.
    pub(crate) fn resize_if_changed(
        &mut self,
        gpu: &GpuContext,
        width: u32,
        height: u32,
    ) -> Result<bool, RenderError> {
        if self.size == (width, height) {
            return Ok(false);
        }
        gpu.check_dimensions(width, height)?;
        let (texture, view) = allocate(&gpu.device, width, height);
        self.texture = texture;
        self.view = view;
        self.size = (width, height);
        tracing::debug!(width, height, "resized drawing surface");
        Ok(true)
    }

    pub(crate) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Copies the current contents back to the CPU.
    pub(crate) fn read_pixels(&self, gpu: &GpuContext) -> Result<RgbaImage, RenderError> {
        let (width, height) = self.size;
        let bytes_per_row = width * 4;
        let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = bytes_per_row.div_ceil(alignment) * alignment;

        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("canvas readback"),
            size: u64::from(padded_bytes_per_row) * u64::from(height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("canvas readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        gpu.device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| RenderError::Gpu(format!("device poll failed: {err}")))?;
        rx.recv()
            .map_err(|_| RenderError::Gpu("readback callback was dropped".into()))?
            .map_err(|err| RenderError::Gpu(format!("failed to map readback buffer: {err}")))?;

        let mut pixels = Vec::with_capacity((bytes_per_row * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded_bytes_per_row as usize) {
                pixels.extend_from_slice(&row[..bytes_per_row as usize]);
            }
        }
        buffer.unmap();

        RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| RenderError::Gpu("readback produced a short buffer".into()))
    }
}

fn allocate(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("canvas"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: CANVAS_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
