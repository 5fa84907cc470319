use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::RgbaImage;
use playback::VideoSource;

/// Decoded frames read from a directory of PNG files, standing in for the
/// video element.
#[derive(Debug)]
pub struct ImageSequence {
    frames: Vec<RgbaImage>,
    frame_duration_ms: f64,
    looping: bool,
    current: usize,
    ended: bool,
}

impl ImageSequence {
    pub fn load(dir: &Path, source_fps: f32, looping: bool) -> Result<Self> {
        if !source_fps.is_finite() || source_fps <= 0.0 {
            bail!("source frame rate must be greater than zero (got {source_fps})");
        }

        let files = frame_files(dir)?;
        if files.is_empty() {
            bail!("no PNG frames found in {}", dir.display());
        }

        let mut frames = Vec::with_capacity(files.len());
        for path in &files {
            let frame = image::open(path)
                .with_context(|| format!("failed to decode frame {}", path.display()))?
                .to_rgba8();
            frames.push(frame);
        }

        tracing::info!(
            dir = %dir.display(),
            frames = frames.len(),
            source_fps,
            looping,
            "loaded frame sequence"
        );

        Ok(Self::from_frames(frames, source_fps, looping))
    }

    pub fn from_frames(frames: Vec<RgbaImage>, source_fps: f32, looping: bool) -> Self {
        Self {
            frames,
            frame_duration_ms: 1000.0 / f64::from(source_fps),
            looping,
            current: 0,
            ended: false,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn first_frame(&self) -> Option<&RgbaImage> {
        self.frames.first()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Moves the playhead to the frame showing at `now_ms`.
    pub fn advance(&mut self, now_ms: f64) {
        if self.ended || self.frames.is_empty() {
            return;
        }

        let position = (now_ms.max(0.0) / self.frame_duration_ms).floor() as usize;
        if position < self.frames.len() {
            self.current = position;
        } else if self.looping {
            self.current = position % self.frames.len();
        } else {
            self.current = self.frames.len() - 1;
            self.ended = true;
        }
    }
}

impl VideoSource for ImageSequence {
    fn is_paused(&self) -> bool {
        false
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn current_frame(&self) -> Option<&RgbaImage> {
        self.frames.get(self.current)
    }
}

fn frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read frame directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if path.is_file() && is_png {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
