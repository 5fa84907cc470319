//! CPU rendition of the alpha-extraction shaders.
//!
//! Samples with nearest filtering at pixel centres, so when the output is the
//! size of one sub-image it matches the GPU path texel for texel.

use image::{Rgba, RgbaImage};

use crate::error::RenderError;
use crate::types::Orientation;
use crate::FrameRenderer;

/// Composites `frame` into a `width`x`height` RGBA image.
pub fn composite(
    frame: &RgbaImage,
    orientation: Orientation,
    width: u32,
    height: u32,
) -> Result<RgbaImage, RenderError> {
    validate_split(frame.width(), frame.height(), orientation)?;
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidFrame(format!(
            "output size {width}x{height} must be non-zero"
        )));
    }

    let mut output = RgbaImage::new(width, height);
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let uv = [
            (x as f32 + 0.5) / width as f32,
            1.0 - (y as f32 + 0.5) / height as f32,
        ];
        let (color_uv, matte_uv) = orientation.sample_coords(uv);
        let color = sample_nearest(frame, color_uv);
        let matte = sample_nearest(frame, matte_uv);
        *pixel = Rgba([color[0], color[1], color[2], matte[0]]);
    }
    Ok(output)
}

pub(crate) fn validate_split(
    width: u32,
    height: u32,
    orientation: Orientation,
) -> Result<(), RenderError> {
    let (sub_width, sub_height) = orientation.sub_image_size(width, height);
    if sub_width == 0 || sub_height == 0 {
        return Err(RenderError::InvalidFrame(format!(
            "{width}x{height} frame cannot hold a {orientation} colour/alpha pair"
        )));
    }
    Ok(())
}

fn sample_nearest(frame: &RgbaImage, uv: [f32; 2]) -> [u8; 4] {
    let texel = |coord: f32, extent: u32| -> u32 {
        let scaled = (coord * extent as f32).floor();
        (scaled.max(0.0) as u32).min(extent - 1)
    };
    let x = texel(uv[0], frame.width());
    let y = texel(uv[1], frame.height());
    frame.get_pixel(x, y).0
}

/// Software backend used when no GPU adapter is wanted or available.
#[derive(Debug, Default)]
pub struct CpuMatte {
    frame: Option<RgbaImage>,
    output: Option<RgbaImage>,
}

impl CpuMatte {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameRenderer for CpuMatte {
    fn set_texture(&mut self, frame: &RgbaImage) -> Result<(), RenderError> {
        match self.frame.as_mut() {
            Some(existing) if existing.dimensions() == frame.dimensions() => {
                existing.copy_from_slice(frame.as_raw());
            }
            _ => self.frame = Some(frame.clone()),
        }
        Ok(())
    }

    fn render(&mut self, width: u32, height: u32, orientation: Orientation) -> Result<(), RenderError> {
        let frame = self.frame.as_ref().ok_or_else(|| {
            RenderError::InvalidFrame("render called before a frame was uploaded".into())
        })?;
        self.output = Some(composite(frame, orientation, width, height)?);
        Ok(())
    }

    fn read_pixels(&mut self) -> Result<RgbaImage, RenderError> {
        self.output
            .clone()
            .ok_or_else(|| RenderError::InvalidFrame("nothing has been rendered yet".into()))
    }
}
