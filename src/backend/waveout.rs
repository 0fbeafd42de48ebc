//! Waveform output register backend
//!
//! One global gain register, left channel in the low word and right channel
//! in the high word. There is no line addressing and no mute.

use crate::backend::{BackendKind, VolumeBackend};
use crate::constants::WAVE_CHANNEL_MAX;
use crate::error::{ControlKind, Error, Result};
use crate::platform::{MmError, WaveOutSystem};
use crate::protocol::{clamp_fraction, Request, VolumeReport};

const TARGET: &str = "waveform output";

/// Same level replicated into both channel halves
pub fn pack_channels(fraction: f32) -> u32 {
    let level = (f64::from(clamp_fraction(fraction)) * f64::from(WAVE_CHANNEL_MAX)).round() as u32;
    let level = level.min(WAVE_CHANNEL_MAX);
    level | (level << 16)
}

/// Average of both channel halves, normalized
pub fn unpack_channels(packed: u32) -> f32 {
    let left = packed & WAVE_CHANNEL_MAX;
    let right = packed >> 16;
    let average = f64::from(left + right) / 2.0;
    (average / f64::from(WAVE_CHANNEL_MAX)) as f32
}

/// Volume of the waveform output register
pub struct WaveOutBackend<'a> {
    system: &'a dyn WaveOutSystem,
}

impl<'a> WaveOutBackend<'a> {
    pub fn new(system: &'a dyn WaveOutSystem) -> Self {
        Self { system }
    }

    fn error(err: MmError) -> Error {
        Error::from_mmresult(BackendKind::WaveOut, err.0, TARGET, ControlKind::Volume)
    }
}

impl VolumeBackend for WaveOutBackend<'_> {
    fn kind(&self) -> BackendKind {
        BackendKind::WaveOut
    }

    fn supports_mute(&self) -> bool {
        false
    }

    fn execute(&self, request: &Request) -> Result<VolumeReport> {
        let ops = request.operations;
        if ops.touches_mute() {
            return Err(Error::ControlUnavailable {
                control: ControlKind::Mute,
                target: TARGET.to_string(),
                code: None,
            });
        }

        let mut report = VolumeReport::default();
        if ops.sets_volume() {
            let packed = pack_channels(request.volume);
            tracing::debug!("Writing waveform register 0x{:08X}", packed);
            self.system.set_volume(packed).map_err(Self::error)?;
        }
        if ops.gets_volume() {
            let packed = self.system.volume().map_err(Self::error)?;
            report.volume = Some(unpack_channels(packed));
        }

        Ok(report)
    }
}
