use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Frame rate the preview loop targets unless configured otherwise.
pub const DEFAULT_FPS: f32 = 18.0;
/// Fraction of the packed sub-image size used for the drawing surface.
pub const DEFAULT_SCALE: f32 = 0.8;
/// Only sources ending with this suffix get the shader path.
pub const DEFAULT_EXTENSION: &str = ".mp4";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which axis the packed colour/alpha halves are laid out along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitAxis {
    /// Colour on the left half, alpha on the right half.
    #[default]
    Horizontal,
    /// Colour on the top half, alpha on the bottom half.
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CardConfig {
    pub version: u32,
    #[serde(default)]
    pub playback: PlaybackSection,
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub render: RenderSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSection {
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(
        default = "default_refresh_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub refresh_interval: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSection {
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RenderSection {
    #[serde(default)]
    pub orientation: SplitAxis,
    #[serde(default)]
    pub gpu_power: PowerSetting,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            version: 1,
            playback: PlaybackSection::default(),
            source: SourceSection::default(),
            render: RenderSection::default(),
        }
    }
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            scale: default_scale(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

fn default_fps() -> f32 {
    DEFAULT_FPS
}

fn default_scale() -> f32 {
    DEFAULT_SCALE
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_refresh_interval() -> Duration {
    Duration::from_millis(16)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of milliseconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_millis(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_millis(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v / 1000.0))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl CardConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: CardConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Loads the file at `path`, or returns the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        let fps = self.playback.fps;
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "playback.fps must be greater than zero (got {fps})"
            )));
        }

        let scale = self.playback.scale;
        if !scale.is_finite() || scale <= 0.0 || scale > 4.0 {
            return Err(ConfigError::Invalid(format!(
                "playback.scale must be within (0, 4] (got {scale})"
            )));
        }

        if self.playback.refresh_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "playback.refresh_interval must be greater than zero".into(),
            ));
        }

        if self.source.extension.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "source.extension may not be empty".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[playback]
fps = 24
scale = 0.5
refresh_interval = "8ms"

[source]
extension = ".webm"

[render]
orientation = "vertical"
gpu_power = "high"
"#;

    #[test]
    fn parses_sample_config() {
        let config = CardConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.playback.fps, 24.0);
        assert_eq!(config.playback.scale, 0.5);
        assert_eq!(config.playback.refresh_interval, Duration::from_millis(8));
        assert_eq!(config.source.extension, ".webm");
        assert_eq!(config.render.orientation, SplitAxis::Vertical);
        assert_eq!(config.render.gpu_power, PowerSetting::High);
    }

    #[test]
    fn empty_sections_fall_back_to_defaults() {
        let config = CardConfig::from_toml_str("version = 1\n").unwrap();
        assert_eq!(config.playback.fps, DEFAULT_FPS);
        assert_eq!(config.playback.scale, DEFAULT_SCALE);
        assert_eq!(config.source.extension, DEFAULT_EXTENSION);
        assert_eq!(config.render.orientation, SplitAxis::Horizontal);
    }

    #[test]
    fn numeric_refresh_interval_is_milliseconds() {
        let config = CardConfig::from_toml_str(
            r#"
version = 1

[playback]
refresh_interval = 33
"#,
        )
        .unwrap();
        assert_eq!(config.playback.refresh_interval, Duration::from_millis(33));
    }

    #[test]
    fn rejects_zero_fps() {
        let err = CardConfig::from_toml_str(
            r#"
version = 1

[playback]
fps = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = CardConfig::from_toml_str("version = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_blank_extension() {
        let err = CardConfig::from_toml_str(
            r#"
version = 1

[source]
extension = "  "
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = CardConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.playback.fps, DEFAULT_FPS);
    }

    #[test]
    fn loads_config_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cardpreview.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = CardConfig::load_or_default(&path).unwrap();
        assert_eq!(config.source.extension, ".webm");
    }
}
