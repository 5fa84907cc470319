use std::fmt;

/// Shader stage reported alongside compilation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub(crate) fn to_naga(self) -> wgpu::naga::ShaderStage {
        match self {
            StageKind::Vertex => wgpu::naga::ShaderStage::Vertex,
            StageKind::Fragment => wgpu::naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: StageKind, log: String },
    #[error("shader program failed to link:\n{log}")]
    ShaderLink { log: String },
    #[error("drawing surface is not available yet")]
    MissingSurface,
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("GPU error: {0}")]
    Gpu(String),
}

impl RenderError {
    /// Configuration errors that will not go away by retrying later.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RenderError::MissingSurface)
    }
}
