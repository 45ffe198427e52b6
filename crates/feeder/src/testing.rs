use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::capture::PixelBuffer;
use crate::host::RenderHost;
use crate::uniforms::{ShadertoyInputs, UniformSlots};

/// In-memory render host recording every interaction.
pub(crate) struct StubHost {
    width: u32,
    height: u32,
    close_after: Option<u64>,
    fail_frame_at: Option<u64>,
    pub inputs: ShadertoyInputs,
    pub history: Vec<ShadertoyInputs>,
    pub frames: u64,
    pub native_captures: Vec<(PathBuf, u32)>,
    pub reads: usize,
    pub shader_path: Option<PathBuf>,
    pub shader_swapped_at: Option<u64>,
    pub fail_native: bool,
}

impl StubHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            close_after: None,
            fail_frame_at: None,
            inputs: ShadertoyInputs::new(),
            history: Vec::new(),
            frames: 0,
            native_captures: Vec::new(),
            reads: 0,
            shader_path: None,
            shader_swapped_at: None,
            fail_native: false,
        }
    }

    pub fn close_after(mut self, frames: u64) -> Self {
        self.close_after = Some(frames);
        self
    }

    pub fn fail_frame_at(mut self, frame: u64) -> Self {
        self.fail_frame_at = Some(frame);
        self
    }
}

impl RenderHost for StubHost {
    fn should_close(&self) -> bool {
        self.close_after
            .map(|limit| self.frames >= limit)
            .unwrap_or(false)
    }

    fn frame(&mut self) -> Result<()> {
        if self.fail_frame_at == Some(self.frames + 1) {
            bail!("device lost");
        }
        self.history.push(self.inputs);
        self.frames += 1;
        Ok(())
    }

    fn shader_inputs(&mut self) -> &mut dyn UniformSlots {
        &mut self.inputs
    }

    fn set_shader_path(&mut self, path: &Path) -> Result<()> {
        self.shader_path = Some(path.to_path_buf());
        self.shader_swapped_at = Some(self.frames);
        Ok(())
    }

    fn capture_output(&mut self, path: &Path, output_index: u32) -> Result<()> {
        if self.fail_native {
            bail!("screenshot unsupported");
        }
        self.native_captures.push((path.to_path_buf(), output_index));
        Ok(())
    }

    fn read_output(&mut self) -> Result<PixelBuffer> {
        self.reads += 1;
        // Solid blue in BGRA order.
        Ok(PixelBuffer::filled(self.width, self.height, [255, 0, 0, 255])?)
    }

    fn properties(&self) -> serde_json::Value {
        serde_json::json!({ "shaderInputs": self.inputs })
    }
}
