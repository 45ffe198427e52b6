use std::time::{Duration, Instant};

/// Frame rate reported until a non-zero frame delta has been observed.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Abstraction over where frame timestamps originate from.
pub trait Clock {
    /// Reads the current timestamp. Successive reads must never go backwards.
    fn now(&mut self) -> Instant;
}

/// Clock backed by the system monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// Synthetic clock that advances by a fixed step on every read.
///
/// Useful for deterministic runs: with a step of 100ms every tick reports a
/// delta of exactly 0.1s and a frame rate of 10.
#[derive(Debug, Clone, Copy)]
pub struct SteppedClock {
    current: Instant,
    step: Duration,
}

impl SteppedClock {
    pub fn new(step: Duration) -> Self {
        Self::starting_at(Instant::now(), step)
    }

    pub fn starting_at(origin: Instant, step: Duration) -> Self {
        Self {
            current: origin,
            step,
        }
    }
}

impl Clock for SteppedClock {
    fn now(&mut self) -> Instant {
        let value = self.current;
        self.current += self.step;
        value
    }
}

/// Timing values derived for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TimingSnapshot {
    /// Viewport resolution as `(width, height, 0)`.
    pub resolution: [f32; 3],
    /// Seconds since the clock was initialised.
    pub time: f64,
    /// Seconds since the previous tick.
    pub time_delta: f64,
    /// `1 / time_delta`, or the previous rate when the delta is zero.
    pub frame_rate: f64,
    /// 1-based frame counter.
    pub frame: u64,
}

/// Wall-clock driven frame timeline.
///
/// Created at loop entry; `tick` is called exactly once per iteration.
#[derive(Debug)]
pub struct FrameClock<C: Clock> {
    clock: C,
    resolution: (u32, u32),
    start_time: Instant,
    previous_time: Instant,
    frame_index: u64,
    frame_rate: f64,
}

impl<C: Clock> FrameClock<C> {
    /// Records the start timestamp and resets the frame counter to zero.
    pub fn new(mut clock: C, width: u32, height: u32) -> Self {
        let now = clock.now();
        Self {
            clock,
            resolution: (width, height),
            start_time: now,
            previous_time: now,
            frame_index: 0,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn tick(&mut self) -> TimingSnapshot {
        let now = self.clock.now();
        let delta = now.saturating_duration_since(self.previous_time);
        let elapsed = now.saturating_duration_since(self.start_time);
        self.previous_time = now;
        self.frame_index = self.frame_index.saturating_add(1);

        // A zero delta means the clock did not advance between reads; keep
        // the last finite rate rather than reporting infinity.
        if !delta.is_zero() {
            self.frame_rate = 1.0 / delta.as_secs_f64();
        }

        let (width, height) = self.resolution;
        TimingSnapshot {
            resolution: [width as f32, height as f32, 0.0],
            time: elapsed.as_secs_f64(),
            time_delta: delta.as_secs_f64(),
            frame_rate: self.frame_rate,
            frame: self.frame_index,
        }
    }
}
