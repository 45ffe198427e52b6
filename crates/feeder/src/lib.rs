//! Frame clock and uniform feeder for ShaderToy-style render passes.
//!
//! The render host (window, device, render graph, pass) lives outside this
//! crate and is reached through [`RenderHost`]. Every iteration of the
//! display loop looks like:
//!
//! ```text
//!   FrameClock::tick() ──▶ apply_to(pass inputs) ──▶ host.frame()
//!                                                        │
//!                          maybe_capture() ◀─────────────┘
//!                          (native + manual, then shader swap)
//! ```
//!
//! The loop ends only when the host reports `should_close`.

mod capture;
mod clock;
mod driver;
mod host;
mod uniforms;

#[cfg(test)]
mod testing;

pub use capture::{
    maybe_capture, CaptureError, CaptureMethod, CaptureReport, CaptureTrigger, ImageEncoder,
    PixelBuffer, PngEncoder, BGRA_TO_RGBA,
};
pub use clock::{
    Clock, FrameClock, SteppedClock, SystemClock, TimingSnapshot, DEFAULT_FRAME_RATE,
};
pub use driver::{FeederSettings, FrameFeeder, RunSummary};
pub use host::RenderHost;
pub use uniforms::{apply_to, ShadertoyInputs, UniformSlot, UniformSlots, UniformValue};
