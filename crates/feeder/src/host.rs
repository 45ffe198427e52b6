use std::path::Path;

use anyhow::Result;

use crate::capture::PixelBuffer;
use crate::uniforms::UniformSlots;

/// Narrow view of the external render host driving a single Shadertoy pass.
///
/// The host owns the window, device and render graph. Errors returned from
/// any method are opaque to the feeder and end the loop as-is.
pub trait RenderHost {
    /// Loop termination signal, polled once per iteration.
    fn should_close(&self) -> bool;

    /// Advances and presents one frame. Blocks until submission completes.
    fn frame(&mut self) -> Result<()>;

    /// Uniform inputs of the active pass.
    fn shader_inputs(&mut self) -> &mut dyn UniformSlots;

    /// Swaps the shader source used by the active pass.
    fn set_shader_path(&mut self, path: &Path) -> Result<()>;

    /// Host-native screenshot of the marked output.
    fn capture_output(&mut self, path: &Path, output_index: u32) -> Result<()>;

    /// Reads the marked output back as 4-channel pixels in the host's
    /// native channel order.
    fn read_output(&mut self) -> Result<PixelBuffer>;

    /// Diagnostic property dump of the active pass.
    fn properties(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}
