use image::RgbaImage;
use renderer::{FrameRenderer, Orientation, RenderError};

/// Unshaded playback: presents the packed frame as decoded, both halves
/// included.
#[derive(Debug, Default)]
pub struct Passthrough {
    frame: Option<RgbaImage>,
}

impl FrameRenderer for Passthrough {
    fn set_texture(&mut self, frame: &RgbaImage) -> Result<(), RenderError> {
        self.frame = Some(frame.clone());
        Ok(())
    }

    fn render(&mut self, _width: u32, _height: u32, _orientation: Orientation) -> Result<(), RenderError> {
        if self.frame.is_none() {
            return Err(RenderError::InvalidFrame("no frame to present".into()));
        }
        Ok(())
    }

    fn read_pixels(&mut self) -> Result<RgbaImage, RenderError> {
        self.frame
            .clone()
            .ok_or_else(|| RenderError::InvalidFrame("no frame to present".into()))
    }
}
