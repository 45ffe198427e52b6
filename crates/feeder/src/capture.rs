use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use feedconfig::CaptureConfig;
use image::{ImageFormat, RgbaImage};
use tracing::{debug, error, info};

use crate::host::RenderHost;

/// Channel order that swaps the first and third channel (BGRA to RGBA).
pub const BGRA_TO_RGBA: [usize; 4] = [2, 1, 0, 3];

const CHANNELS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("pixel buffer holds {actual} bytes; {width}x{height}x4 needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("pixel buffer dimensions {width}x{height} exceed addressable memory")]
    Dimensions { width: u32, height: u32 },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Raw 8-bit, 4-channel pixels laid out as `(height, width, 4)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

fn byte_len(width: u32, height: u32) -> Result<usize, CaptureError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or(CaptureError::Dimensions { width, height })
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(CaptureError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer where every pixel carries the same channel values.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Result<Self, CaptureError> {
        let count = byte_len(width, height)? / CHANNELS;
        Ok(Self {
            width,
            height,
            data: pixel.repeat(count),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        Some(pixel)
    }

    /// Rearranges each pixel so output channel `i` takes input channel `order[i]`.
    pub fn reorder_channels(&mut self, order: [usize; 4]) {
        for pixel in self.data.chunks_exact_mut(CHANNELS) {
            let source = [pixel[0], pixel[1], pixel[2], pixel[3]];
            for (slot, &index) in pixel.iter_mut().zip(order.iter()) {
                *slot = source[index % CHANNELS];
            }
        }
    }

}

/// Persists a pixel buffer as an image file.
pub trait ImageEncoder {
    fn encode(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), CaptureError>;
}

/// Writes RGBA buffers as PNG files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn encode(&self, buffer: &PixelBuffer, path: &Path) -> Result<(), CaptureError> {
        let image = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.data().to_vec())
            .ok_or(CaptureError::BufferSize {
                width: buffer.width(),
                height: buffer.height(),
                expected: byte_len(buffer.width(), buffer.height())?,
                actual: buffer.data().len(),
            })?;
        image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| CaptureError::Encode {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// The two independent ways a frame is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMethod {
    /// Screenshot taken by the render host itself.
    Native,
    /// Output read back, channel-swapped and encoded here.
    Manual,
}

impl CaptureMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureMethod::Native => "native",
            CaptureMethod::Manual => "manual",
        }
    }
}

impl fmt::Display for CaptureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureTrigger {
    pub trigger_frame: u64,
    pub directory: PathBuf,
    pub file_pattern: String,
    pub output_index: u32,
    /// Shader installed on the pass once both captures succeed.
    pub next_shader: Option<PathBuf>,
}

impl CaptureTrigger {
    pub fn new(trigger_frame: u64, directory: impl Into<PathBuf>) -> Self {
        Self {
            trigger_frame,
            directory: directory.into(),
            file_pattern: feedconfig::DEFAULT_FILE_PATTERN.to_string(),
            output_index: 0,
            next_shader: None,
        }
    }

    pub fn with_next_shader(mut self, path: impl Into<PathBuf>) -> Self {
        self.next_shader = Some(path.into());
        self
    }

    /// Returns `None` when capturing is disabled.
    pub fn from_config(config: &CaptureConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(Self {
            trigger_frame: config.trigger_frame,
            directory: config.directory.clone(),
            file_pattern: config.file_pattern.clone(),
            output_index: config.output_index,
            next_shader: config.next_shader.clone(),
        })
    }

    pub fn output_path(&self, frame: u64, method: CaptureMethod) -> PathBuf {
        let file_name = self
            .file_pattern
            .replace("{frame}", &frame.to_string())
            .replace("{method}", method.as_str());
        self.directory.join(file_name)
    }
}

/// Files written by a fired capture.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CaptureReport {
    pub frame: u64,
    pub native: PathBuf,
    pub manual: PathBuf,
    pub next_shader: Option<PathBuf>,
}

/// Captures the output when `frame_index` equals the trigger frame exactly.
///
/// Both capture paths are always attempted. The shader swap only happens when
/// both succeeded; otherwise the failure is returned.
pub fn maybe_capture(
    frame_index: u64,
    trigger: &CaptureTrigger,
    host: &mut dyn RenderHost,
    encoder: &dyn ImageEncoder,
) -> Result<Option<CaptureReport>> {
    if frame_index != trigger.trigger_frame {
        return Ok(None);
    }

    ensure_directory(&trigger.directory)?;

    let native_path = trigger.output_path(frame_index, CaptureMethod::Native);
    let manual_path = trigger.output_path(frame_index, CaptureMethod::Manual);

    let native = host
        .capture_output(&native_path, trigger.output_index)
        .with_context(|| format!("native capture to {} failed", native_path.display()));
    let manual = capture_manual(host, encoder, &manual_path)
        .with_context(|| format!("manual capture to {} failed", manual_path.display()));

    match (native, manual) {
        (Ok(()), Ok(())) => {}
        (Err(err), Ok(())) | (Ok(()), Err(err)) => {
            error!(frame = frame_index, error = ?err, "capture failed");
            return Err(err);
        }
        (Err(native_err), Err(manual_err)) => {
            error!(frame = frame_index, error = ?native_err, "capture failed");
            error!(frame = frame_index, error = ?manual_err, "capture failed");
            bail!("both capture paths failed: {native_err:#}; {manual_err:#}");
        }
    }

    info!(
        frame = frame_index,
        native = %native_path.display(),
        manual = %manual_path.display(),
        "frame captured"
    );

    if let Some(shader) = trigger.next_shader.as_ref() {
        host.set_shader_path(shader)
            .with_context(|| format!("failed to switch shader to {}", shader.display()))?;
        info!(shader = %shader.display(), "switched pass shader");
    }

    Ok(Some(CaptureReport {
        frame: frame_index,
        native: native_path,
        manual: manual_path,
        next_shader: trigger.next_shader.clone(),
    }))
}

fn capture_manual(
    host: &mut dyn RenderHost,
    encoder: &dyn ImageEncoder,
    path: &Path,
) -> Result<()> {
    let mut buffer = host.read_output().context("failed to read pass output")?;
    buffer.reorder_channels(BGRA_TO_RGBA);
    encoder.encode(&buffer, path)?;
    Ok(())
}

fn ensure_directory(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    if path.exists() {
        if path.is_dir() {
            debug!(path = %path.display(), "reusing existing capture directory");
            Ok(())
        } else {
            bail!("filesystem entry at {} is not a directory", path.display());
        }
    } else {
        fs::create_dir_all(path).with_context(|| {
            format!("failed to create capture directory at {}", path.display())
        })?;
        info!(path = %path.display(), "created capture directory");
        Ok(())
    }
}
