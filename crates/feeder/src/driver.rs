use anyhow::Result;
use feedconfig::FeederConfig;
use tracing::{debug, info, trace};

use crate::capture::{maybe_capture, CaptureReport, CaptureTrigger, ImageEncoder, PngEncoder};
use crate::clock::{Clock, FrameClock, SystemClock, TimingSnapshot};
use crate::host::RenderHost;
use crate::uniforms::apply_to;

/// Explicit run configuration handed to the loop driver.
#[derive(Debug, Clone, PartialEq)]
pub struct FeederSettings {
    pub width: u32,
    pub height: u32,
    pub capture: Option<CaptureTrigger>,
}

impl FeederSettings {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            capture: None,
        }
    }

    pub fn with_capture(mut self, trigger: CaptureTrigger) -> Self {
        self.capture = Some(trigger);
        self
    }
}

impl From<&FeederConfig> for FeederSettings {
    fn from(config: &FeederConfig) -> Self {
        let (width, height) = config.resolution();
        Self {
            width,
            height,
            capture: CaptureTrigger::from_config(&config.capture),
        }
    }
}

/// Outcome of a completed display loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub capture: Option<CaptureReport>,
    pub last: Option<TimingSnapshot>,
}

/// Drives the display loop of a render host, feeding per-frame timing
/// uniforms and firing the one-shot capture.
pub struct FrameFeeder<C: Clock = SystemClock, E: ImageEncoder = PngEncoder> {
    settings: FeederSettings,
    clock: Option<C>,
    encoder: E,
}

impl FrameFeeder {
    pub fn new(settings: FeederSettings) -> Self {
        Self::with_parts(settings, SystemClock::new(), PngEncoder)
    }
}

impl<C: Clock, E: ImageEncoder> FrameFeeder<C, E> {
    pub fn with_parts(settings: FeederSettings, clock: C, encoder: E) -> Self {
        Self {
            settings,
            clock: Some(clock),
            encoder,
        }
    }

    /// Runs until `host.should_close()` reports true.
    ///
    /// Any host failure ends the loop and is returned unchanged. The feeder
    /// is single-use; a second call fails.
    pub fn run(&mut self, host: &mut dyn RenderHost) -> Result<RunSummary> {
        let clock = self
            .clock
            .take()
            .ok_or_else(|| anyhow::anyhow!("frame feeder has already run"))?;

        info!(properties = %host.properties(), "pass properties before loop");

        let mut timeline = FrameClock::new(clock, self.settings.width, self.settings.height);
        let mut summary = RunSummary {
            frames: 0,
            capture: None,
            last: None,
        };

        while !host.should_close() {
            let snapshot = timeline.tick();
            trace!(
                frame = snapshot.frame,
                time = snapshot.time,
                delta = snapshot.time_delta,
                fps = snapshot.frame_rate,
                "feeding uniforms"
            );
            apply_to(host.shader_inputs(), &snapshot);
            host.frame()?;

            if let Some(trigger) = self.settings.capture.as_ref() {
                if let Some(report) =
                    maybe_capture(snapshot.frame, trigger, host, &self.encoder)?
                {
                    summary.capture = Some(report);
                }
            }

            summary.frames = snapshot.frame;
            summary.last = Some(snapshot);
        }

        if summary.capture.is_none() {
            if let Some(trigger) = self.settings.capture.as_ref() {
                debug!(
                    frames = summary.frames,
                    trigger = trigger.trigger_frame,
                    "loop closed before capture frame"
                );
            }
        }
        info!(properties = %host.properties(), frames = summary.frames, "pass properties after loop");

        Ok(summary)
    }
}
