//! Request/response contract shared by all volume backends
//!
//! ## Operations byte
//!
//! ```text
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │  7  │  6  │  5  │  4  │  3  │  2  │  1  │  0  │
//! │ RSV │ RSV │ RSV │ RSV │GMUTE│SMUTE│ GVOL│ SVOL│
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//! ```
//!
//! Set and get bits are independent: any set may be combined with any get.
//! Mutations always run before reads within one request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Set of requested actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Operations(u8);

impl Operations {
    pub const SET_VOLUME: u8 = 0x01;
    pub const GET_VOLUME: u8 = 0x02;
    pub const SET_MUTE: u8 = 0x04;
    pub const GET_MUTE: u8 = 0x08;

    pub fn new() -> Self {
        Self(0)
    }

    pub fn set_volume(mut self, value: bool) -> Self {
        self.toggle(Self::SET_VOLUME, value);
        self
    }

    pub fn get_volume(mut self, value: bool) -> Self {
        self.toggle(Self::GET_VOLUME, value);
        self
    }

    pub fn set_mute(mut self, value: bool) -> Self {
        self.toggle(Self::SET_MUTE, value);
        self
    }

    pub fn get_mute(mut self, value: bool) -> Self {
        self.toggle(Self::GET_MUTE, value);
        self
    }

    fn toggle(&mut self, bit: u8, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn sets_volume(&self) -> bool {
        self.0 & Self::SET_VOLUME != 0
    }

    pub fn gets_volume(&self) -> bool {
        self.0 & Self::GET_VOLUME != 0
    }

    pub fn sets_mute(&self) -> bool {
        self.0 & Self::SET_MUTE != 0
    }

    pub fn gets_mute(&self) -> bool {
        self.0 & Self::GET_MUTE != 0
    }

    /// Any volume operation requested
    pub fn touches_volume(&self) -> bool {
        self.sets_volume() || self.gets_volume()
    }

    /// Any mute operation requested
    pub fn touches_mute(&self) -> bool {
        self.sets_mute() || self.gets_mute()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn as_byte(&self) -> u8 {
        self.0
    }

    /// Reserved bits are dropped
    pub fn from_byte(byte: u8) -> Self {
        Self(byte & 0x0F)
    }
}

/// Target line of a request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum LineSelector {
    /// Speakers / default render endpoint
    #[default]
    #[serde(rename = "output")]
    #[value(name = "output")]
    PrimaryOutput,
    /// Microphone / default capture endpoint
    #[serde(rename = "input")]
    #[value(name = "input")]
    PrimaryInput,
    /// Wave-out source line of the legacy mixer
    #[serde(rename = "wave-out")]
    #[value(name = "wave-out")]
    LegacyWaveOut,
    /// Line-in source line of the legacy mixer
    #[serde(rename = "line-in")]
    #[value(name = "line-in")]
    LegacyLineIn,
    /// CD audio source line of the legacy mixer
    #[value(name = "cd")]
    #[serde(rename = "cd")]
    LegacyCd,
    /// MIDI synthesizer source line of the legacy mixer
    #[value(name = "midi")]
    #[serde(rename = "midi")]
    LegacyMidiSynth,
}

impl LineSelector {
    /// Every selector, in declaration order
    pub const ALL: [LineSelector; 6] = [
        Self::PrimaryOutput,
        Self::PrimaryInput,
        Self::LegacyWaveOut,
        Self::LegacyLineIn,
        Self::LegacyCd,
        Self::LegacyMidiSynth,
    ];

    /// True for selectors that only exist as legacy mixer lines
    pub fn is_legacy_only(&self) -> bool {
        !matches!(self, Self::PrimaryOutput | Self::PrimaryInput)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PrimaryOutput => "output",
            Self::PrimaryInput => "input",
            Self::LegacyWaveOut => "wave-out",
            Self::LegacyLineIn => "line-in",
            Self::LegacyCd => "cd",
            Self::LegacyMidiSynth => "midi",
        }
    }
}

impl fmt::Display for LineSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Endpoint data-flow direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFlow {
    /// Playback
    Render,
    /// Recording
    Capture,
}

impl fmt::Display for DataFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render => f.write_str("render"),
            Self::Capture => f.write_str("capture"),
        }
    }
}

/// Clamp a caller supplied fraction into `[0.0, 1.0]`.
///
/// NaN maps to 0.0 so it can never reach a device.
pub fn clamp_fraction(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// One volume/mute request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Requested actions
    pub operations: Operations,

    /// Normalized target volume, meaningful only with SET_VOLUME
    pub volume: f32,

    /// Target mute state, meaningful only with SET_MUTE
    pub mute_target: bool,

    /// Line to operate on
    pub line: LineSelector,

    /// Also drive the legacy waveform output register (volume only)
    pub wave_register: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            operations: Operations::new(),
            volume: 0.0,
            mute_target: false,
            line: LineSelector::PrimaryOutput,
            wave_register: false,
        }
    }
}

impl Request {
    /// Create an empty request for a line
    pub fn new(line: LineSelector) -> Self {
        Self {
            line,
            ..Default::default()
        }
    }

    /// Request a volume change, clamping to `[0.0, 1.0]`
    pub fn with_volume(mut self, fraction: f32) -> Self {
        self.operations = self.operations.set_volume(true);
        self.volume = clamp_fraction(fraction);
        self
    }

    /// Request a volume change given in percent (0-100)
    pub fn with_volume_percent(self, percent: f32) -> Self {
        self.with_volume(percent / 100.0)
    }

    /// Request a mute change
    pub fn with_mute(mut self, muted: bool) -> Self {
        self.operations = self.operations.set_mute(true);
        self.mute_target = muted;
        self
    }

    /// Read the volume back
    pub fn read_volume(mut self) -> Self {
        self.operations = self.operations.get_volume(true);
        self
    }

    /// Read the mute state back
    pub fn read_mute(mut self) -> Self {
        self.operations = self.operations.get_mute(true);
        self
    }

    /// Include the waveform register side-channel
    pub fn with_wave_register(mut self, enabled: bool) -> Self {
        self.wave_register = enabled;
        self
    }

    /// Copy with the volume clamped.
    ///
    /// Requests built field by field may carry out-of-range values; the
    /// service normalizes them here before dispatch.
    pub fn normalized(&self) -> Self {
        Self {
            volume: clamp_fraction(self.volume),
            ..self.clone()
        }
    }
}

/// Observed state after executing a request.
///
/// A field is `Some` only when the matching read was requested and
/// succeeded. A missing mute control never shows up as `Some(false)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeReport {
    /// Observed volume (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,

    /// Observed mute state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,

    /// Observed waveform register volume (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave_volume: Option<f32>,
}

impl VolumeReport {
    /// Volume as a rounded percentage
    pub fn volume_percent(&self) -> Option<u32> {
        self.volume.map(|v| (v * 100.0).round() as u32)
    }

    /// Waveform register volume as a rounded percentage
    pub fn wave_volume_percent(&self) -> Option<u32> {
        self.wave_volume.map(|v| (v * 100.0).round() as u32)
    }
}
