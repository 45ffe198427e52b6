use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use feeder::{ImageEncoder, PixelBuffer, PngEncoder, RenderHost, ShadertoyInputs, UniformSlots};
use serde_json::json;

/// Opaque black, identical in BGRA and RGBA order.
const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 0, 255];

/// Shader the pass loads when no path is configured.
pub const DEFAULT_SHADER_PATH: &str = "RenderPasses/Shadertoy/Shadertoy.ps.slang";

/// Dry-run render host.
///
/// Renders nothing; every frame writes the current pass inputs as one JSON
/// line and the host asks to close after a fixed frame budget. Both capture
/// paths produce placeholder images of the configured size.
pub struct TraceHost<W: Write> {
    width: u32,
    height: u32,
    frame_budget: u64,
    frames: u64,
    inputs: ShadertoyInputs,
    shader_path: PathBuf,
    out: W,
}

impl<W: Write> TraceHost<W> {
    pub fn new(width: u32, height: u32, frame_budget: u64, out: W) -> Self {
        Self {
            width,
            height,
            frame_budget,
            frames: 0,
            inputs: ShadertoyInputs::new(),
            shader_path: PathBuf::from(DEFAULT_SHADER_PATH),
            out,
        }
    }

    fn placeholder(&self) -> Result<PixelBuffer> {
        Ok(PixelBuffer::filled(self.width, self.height, PLACEHOLDER_PIXEL)?)
    }
}

impl<W: Write> RenderHost for TraceHost<W> {
    fn should_close(&self) -> bool {
        self.frames >= self.frame_budget
    }

    fn frame(&mut self) -> Result<()> {
        self.frames += 1;
        let line = json!({
            "frame": self.inputs.i_frame,
            "shaderPath": self.shader_path,
            "shaderInputs": self.inputs,
        });
        writeln!(self.out, "{line}").context("failed to write frame trace")?;
        Ok(())
    }

    fn shader_inputs(&mut self) -> &mut dyn UniformSlots {
        &mut self.inputs
    }

    fn set_shader_path(&mut self, path: &Path) -> Result<()> {
        self.shader_path = path.to_path_buf();
        Ok(())
    }

    fn capture_output(&mut self, path: &Path, output_index: u32) -> Result<()> {
        tracing::debug!(path = %path.display(), output_index, "writing placeholder capture");
        PngEncoder.encode(&self.placeholder()?, path)?;
        Ok(())
    }

    fn read_output(&mut self) -> Result<PixelBuffer> {
        self.placeholder()
    }

    fn properties(&self) -> serde_json::Value {
        json!({
            "shaderPath": self.shader_path,
            "shaderInputs": self.inputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feeder::{FeederSettings, FrameFeeder, SteppedClock};
    use std::time::Duration;

    #[test]
    fn emits_one_line_per_frame() {
        let mut out = Vec::new();
        {
            let mut host = TraceHost::new(8, 8, 3, &mut out);
            let mut feeder = FrameFeeder::with_parts(
                FeederSettings::new(8, 8),
                SteppedClock::new(Duration::from_millis(100)),
                PngEncoder,
            );
            let summary = feeder.run(&mut host).unwrap();
            assert_eq!(summary.frames, 3);
        }

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2]["frame"], json!(3));
        assert_eq!(lines[0]["shaderInputs"]["iResolution"], json!([8.0, 8.0, 0.0]));
    }

    #[test]
    fn placeholder_matches_resolution() {
        let mut host = TraceHost::new(5, 4, 1, std::io::sink());
        let buffer = host.read_output().unwrap();
        assert_eq!((buffer.width(), buffer.height()), (5, 4));
        assert_eq!(buffer.pixel(4, 3), Some(PLACEHOLDER_PIXEL));
    }

    #[test]
    fn properties_start_with_default_shader() {
        let mut host = TraceHost::new(2, 2, 1, std::io::sink());
        let before = host.properties();
        assert_eq!(before["shaderPath"], json!(DEFAULT_SHADER_PATH));
        assert_eq!(before["shaderInputs"]["iFrameRate"], json!(60.0));

        host.set_shader_path(Path::new("alt.slang")).unwrap();
        assert_eq!(host.properties()["shaderPath"], json!("alt.slang"));
    }
}
