use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::clock::TimingSnapshot;

/// Named uniform inputs written by the feeder every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    Resolution,
    Time,
    TimeDelta,
    FrameRate,
    Frame,
}

impl UniformSlot {
    pub const ALL: [UniformSlot; 5] = [
        UniformSlot::Resolution,
        UniformSlot::Time,
        UniformSlot::TimeDelta,
        UniformSlot::FrameRate,
        UniformSlot::Frame,
    ];

    /// Name of the slot as declared in ShaderToy shaders.
    pub fn name(self) -> &'static str {
        match self {
            UniformSlot::Resolution => "iResolution",
            UniformSlot::Time => "iTime",
            UniformSlot::TimeDelta => "iTimeDelta",
            UniformSlot::FrameRate => "iFrameRate",
            UniformSlot::Frame => "iFrame",
        }
    }
}

impl fmt::Display for UniformSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3([f32; 3]),
}

/// Write-only view of the uniform inputs owned by the active pass.
pub trait UniformSlots {
    fn write(&mut self, slot: UniformSlot, value: UniformValue);
}

/// Pushes every field of `snapshot` into its slot, once each.
pub fn apply_to(slots: &mut dyn UniformSlots, snapshot: &TimingSnapshot) {
    let frame = snapshot.frame.min(i32::MAX as u64) as i32;
    slots.write(UniformSlot::Resolution, UniformValue::Vec3(snapshot.resolution));
    slots.write(UniformSlot::Time, UniformValue::Float(snapshot.time as f32));
    slots.write(
        UniformSlot::TimeDelta,
        UniformValue::Float(snapshot.time_delta as f32),
    );
    slots.write(
        UniformSlot::FrameRate,
        UniformValue::Float(snapshot.frame_rate as f32),
    );
    slots.write(UniformSlot::Frame, UniformValue::Int(frame));
}

/// Uniform block consumed by a Shadertoy pass.
///
/// Field order and padding follow std140 so a GPU host can upload the bytes
/// returned by [`ShadertoyInputs::as_bytes`] without repacking.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadertoyInputs {
    pub i_resolution: [f32; 3],
    pub i_time: f32,
    pub i_time_delta: f32,
    pub i_frame_rate: f32,
    pub i_frame: i32,
    pub i_padding0: f32,
    pub i_mouse: [f32; 4],
}

unsafe impl Zeroable for ShadertoyInputs {}
unsafe impl Pod for ShadertoyInputs {}

impl Default for ShadertoyInputs {
    fn default() -> Self {
        Self {
            i_resolution: [1.0; 3],
            i_time: 0.0,
            i_time_delta: 0.0,
            i_frame_rate: 60.0,
            i_frame: 0,
            i_padding0: 0.0,
            i_mouse: [0.0; 4],
        }
    }
}

impl ShadertoyInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mouse(&mut self, mouse: [f32; 4]) {
        self.i_mouse = mouse;
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl UniformSlots for ShadertoyInputs {
    fn write(&mut self, slot: UniformSlot, value: UniformValue) {
        match (slot, value) {
            (UniformSlot::Resolution, UniformValue::Vec3(resolution)) => {
                self.i_resolution = resolution
            }
            (UniformSlot::Time, UniformValue::Float(time)) => self.i_time = time,
            (UniformSlot::TimeDelta, UniformValue::Float(delta)) => self.i_time_delta = delta,
            (UniformSlot::FrameRate, UniformValue::Float(rate)) => self.i_frame_rate = rate,
            (UniformSlot::Frame, UniformValue::Int(frame)) => self.i_frame = frame,
            (slot, value) => {
                tracing::warn!(%slot, ?value, "ignoring uniform write with mismatched type");
            }
        }
    }
}

/// Serialises as the pass property mapping, keyed by ShaderToy names.
impl Serialize for ShadertoyInputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("iResolution", &self.i_resolution)?;
        map.serialize_entry("iTime", &self.i_time)?;
        map.serialize_entry("iTimeDelta", &self.i_time_delta)?;
        map.serialize_entry("iFrameRate", &self.i_frame_rate)?;
        map.serialize_entry("iFrame", &self.i_frame)?;
        map.serialize_entry("iMouse", &self.i_mouse)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSlots {
        writes: Vec<(UniformSlot, UniformValue)>,
    }

    impl UniformSlots for RecordingSlots {
        fn write(&mut self, slot: UniformSlot, value: UniformValue) {
            self.writes.push((slot, value));
        }
    }

    fn snapshot() -> TimingSnapshot {
        TimingSnapshot {
            resolution: [800.0, 600.0, 0.0],
            time: 1.5,
            time_delta: 0.25,
            frame_rate: 4.0,
            frame: 7,
        }
    }

    #[test]
    fn apply_writes_exactly_the_five_slots() {
        let mut slots = RecordingSlots::default();
        apply_to(&mut slots, &snapshot());

        let written: Vec<UniformSlot> = slots.writes.iter().map(|(slot, _)| *slot).collect();
        assert_eq!(written, UniformSlot::ALL.to_vec());
        assert_eq!(
            slots.writes,
            vec![
                (UniformSlot::Resolution, UniformValue::Vec3([800.0, 600.0, 0.0])),
                (UniformSlot::Time, UniformValue::Float(1.5)),
                (UniformSlot::TimeDelta, UniformValue::Float(0.25)),
                (UniformSlot::FrameRate, UniformValue::Float(4.0)),
                (UniformSlot::Frame, UniformValue::Int(7)),
            ]
        );
    }

    #[test]
    fn apply_updates_shadertoy_inputs() {
        let mut inputs = ShadertoyInputs::new();
        inputs.set_mouse([3.0, 4.0, 0.0, 0.0]);
        apply_to(&mut inputs, &snapshot());

        assert_eq!(inputs.i_resolution, [800.0, 600.0, 0.0]);
        assert_eq!(inputs.i_time, 1.5);
        assert_eq!(inputs.i_time_delta, 0.25);
        assert_eq!(inputs.i_frame_rate, 4.0);
        assert_eq!(inputs.i_frame, 7);
        assert_eq!(inputs.i_mouse, [3.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn frame_counter_saturates_at_i32_max() {
        let mut inputs = ShadertoyInputs::new();
        let mut late = snapshot();
        late.frame = u64::from(u32::MAX) + 5;
        apply_to(&mut inputs, &late);
        assert_eq!(inputs.i_frame, i32::MAX);
    }

    #[test]
    fn mismatched_value_leaves_slot_untouched() {
        let mut inputs = ShadertoyInputs::new();
        inputs.write(UniformSlot::Frame, UniformValue::Float(2.0));
        assert_eq!(inputs.i_frame, 0);
    }

    #[test]
    fn uniform_block_matches_std140_size() {
        let inputs = ShadertoyInputs::new();
        assert_eq!(inputs.as_bytes().len(), 48);
        assert_eq!(std::mem::align_of::<ShadertoyInputs>(), 16);
    }

    #[test]
    fn properties_use_shadertoy_names() {
        let value = serde_json::to_value(ShadertoyInputs::new()).unwrap();
        assert_eq!(value["iFrameRate"], serde_json::json!(60.0));
        assert_eq!(value["iFrame"], serde_json::json!(0));
        assert_eq!(value["iResolution"], serde_json::json!([1.0, 1.0, 1.0]));
        assert!(value.get("iMouse").is_some());
    }
}
