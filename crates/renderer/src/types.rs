use std::fmt;

/// Layout of the packed colour + alpha video frame.
///
/// Source assets carry two juxtaposed sub-images: one with the RGB colour, the
/// other with a grayscale matte whose red channel becomes the output alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Colour on the left half, alpha on the right half.
    #[default]
    Horizontal,
    /// Colour on the top half, alpha on the bottom half.
    Vertical,
}

impl Orientation {
    pub const ALL: [Orientation; 2] = [Orientation::Horizontal, Orientation::Vertical];

    /// `true` selects the side-by-side layout, `false` the stacked one.
    pub fn from_flag(horizontal: bool) -> Self {
        if horizontal {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Orientation::Horizontal)
    }

    pub fn toggled(self) -> Self {
        Self::from_flag(!self.is_horizontal())
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Orientation::Horizontal => 0,
            Orientation::Vertical => 1,
        }
    }

    /// Maps a normalised output coordinate to the colour and alpha texture
    /// coordinates sampled for it.
    ///
    /// `uv` has its origin at the bottom-left of the drawing surface (what the
    /// vertex stage emits); the returned coordinates address the texture with
    /// its origin at the top-left. The fragment shaders implement exactly this
    /// mapping.
    pub fn sample_coords(self, uv: [f32; 2]) -> ([f32; 2], [f32; 2]) {
        let [u, v] = uv;
        match self {
            Orientation::Horizontal => {
                let color = [u * 0.5, 1.0 - v];
                (color, [color[0] + 0.5, color[1]])
            }
            Orientation::Vertical => {
                let color = [u, (1.0 - v) * 0.5];
                (color, [color[0], color[1] + 0.5])
            }
        }
    }

    /// Size of one sub-image of a packed frame.
    pub fn sub_image_size(self, frame_width: u32, frame_height: u32) -> (u32, u32) {
        match self {
            Orientation::Horizontal => (frame_width / 2, frame_height),
            Orientation::Vertical => (frame_width, frame_height / 2),
        }
    }

    /// Drawing-surface size for a packed frame scaled by `scale`.
    pub fn output_size(self, frame_width: u32, frame_height: u32, scale: f32) -> (u32, u32) {
        let (width, height) = self.sub_image_size(frame_width, frame_height);
        let scaled = |value: u32| ((value as f32 * scale).round() as u32).max(1);
        (scaled(width), scaled(height))
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => f.write_str("horizontal"),
            Orientation::Vertical => f.write_str("vertical"),
        }
    }
}

/// GPU power hint forwarded to adapter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    #[default]
    Low,
    High,
}

/// Summary of the adapter the context ended up on.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub(crate) fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
    }
}
