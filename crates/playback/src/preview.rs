use cardconfig::CardConfig;
use renderer::RenderError;

/// Decides from the source reference whether the shader path applies at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceGate {
    extension: String,
}

impl SourceGate {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &CardConfig) -> Self {
        Self::new(config.source.extension.clone())
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Exact, case-sensitive suffix match on the full reference.
    pub fn accepts(&self, source: &str) -> bool {
        source.ends_with(&self.extension)
    }
}

impl Default for SourceGate {
    fn default() -> Self {
        Self::new(cardconfig::DEFAULT_EXTENSION)
    }
}

/// How a source ends up being presented.
pub enum Preview<R> {
    /// Unshaded playback: the gate rejected the source or the shaders failed.
    Plain,
    /// The drawing surface is not mounted yet; try again later.
    NotReady,
    /// Alpha-matted playback through `R`.
    Shaded(R),
}

impl<R> Preview<R> {
    /// Runs the initialisation policy for `source`.
    ///
    /// `build` is only invoked when the gate accepts the source. A missing
    /// surface is transient and yields [`Preview::NotReady`]; every other
    /// error is logged and falls back to [`Preview::Plain`].
    pub fn initialise<F>(gate: &SourceGate, source: &str, build: F) -> Self
    where
        F: FnOnce() -> Result<R, RenderError>,
    {
        if !gate.accepts(source) {
            tracing::info!(
                source,
                extension = gate.extension(),
                "source not eligible for alpha matte; using plain playback"
            );
            return Preview::Plain;
        }

        match build() {
            Ok(renderer) => Preview::Shaded(renderer),
            Err(error) if !error.is_fatal() => {
                tracing::debug!(source, %error, "deferring shader setup");
                Preview::NotReady
            }
            Err(error) => {
                tracing::warn!(source, %error, "alpha matte unavailable; falling back to plain playback");
                Preview::Plain
            }
        }
    }

    pub fn is_shaded(&self) -> bool {
        matches!(self, Preview::Shaded(_))
    }
}
