//! OS audio subsystem seam
//!
//! Each backend talks to the OS through one of these traits. Every handle
//! returned from an `open` call releases its OS resources on drop, so an
//! early `?` return can never leak an enumerator, interface or mixer handle.

use std::fmt;

use crate::error::Result;
use crate::protocol::DataFlow;

#[cfg(windows)]
pub mod win32;

#[cfg(any(test, feature = "simulation"))]
pub mod sim;

/// Raw MMRESULT returned by the legacy multimedia API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmError(pub u32);

impl fmt::Display for MmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MMRESULT {}", self.0)
    }
}

/// Result of a legacy multimedia call
pub type MmResult<T> = std::result::Result<T, MmError>;

/// Source of default audio endpoints
pub trait EndpointSystem {
    /// Acquire an enumeration session, resolve the default console endpoint
    /// for `flow` and activate its volume interface
    fn open(&self, flow: DataFlow) -> Result<Box<dyn EndpointVolume + '_>>;
}

/// Activated per-endpoint volume interface, native unit `[0.0, 1.0]`
pub trait EndpointVolume {
    fn volume(&self) -> Result<f32>;
    fn set_volume(&self, level: f32) -> Result<()>;
    fn mute(&self) -> Result<bool>;
    fn set_mute(&self, muted: bool) -> Result<()>;
}

/// Mixer line located by component type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerLine {
    pub line_id: u32,
    pub component_type: u32,
    pub name: String,
    pub control_count: u32,
}

/// Single control of a mixer line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerControl {
    pub control_id: u32,
    pub control_type: u32,
    pub minimum: u32,
    pub maximum: u32,
}

/// Legacy software mixer
pub trait MixerSystem {
    /// Open the default mixer device
    fn open(&self) -> MmResult<Box<dyn MixerDevice + '_>>;
}

/// Open mixer device; closed on drop
pub trait MixerDevice {
    fn line_by_component(&self, component_type: u32) -> MmResult<MixerLine>;
    /// Exactly one control of `control_type` on `line`
    fn control_by_type(&self, line: &MixerLine, control_type: u32) -> MmResult<MixerControl>;
    fn unsigned_value(&self, control: &MixerControl) -> MmResult<u32>;
    fn set_unsigned_value(&self, control: &MixerControl, value: u32) -> MmResult<()>;
    fn boolean_value(&self, control: &MixerControl) -> MmResult<bool>;
    fn set_boolean_value(&self, control: &MixerControl, value: bool) -> MmResult<()>;
}

/// Waveform output volume register.
///
/// Low word is the left channel, high word the right channel.
pub trait WaveOutSystem {
    fn volume(&self) -> MmResult<u32>;
    fn set_volume(&self, packed: u32) -> MmResult<()>;
}

/// All OS subsystems a service may dispatch to
pub struct AudioHost {
    pub endpoints: Box<dyn EndpointSystem>,
    pub mixer: Box<dyn MixerSystem>,
    pub wave_out: Box<dyn WaveOutSystem>,
}

impl AudioHost {
    pub fn new(
        endpoints: Box<dyn EndpointSystem>,
        mixer: Box<dyn MixerSystem>,
        wave_out: Box<dyn WaveOutSystem>,
    ) -> Self {
        Self {
            endpoints,
            mixer,
            wave_out,
        }
    }

    /// Host backed by the running OS
    #[cfg(windows)]
    pub fn system() -> Self {
        Self::new(
            Box::new(win32::CoreAudioEndpoints),
            Box::new(win32::WinMixer::default()),
            Box::new(win32::WinWaveOut),
        )
    }
}
