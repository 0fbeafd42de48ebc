//! Legacy multimedia tags, result codes and crate defaults
//!
//! Values mirror `mmsystem.h`. They are kept here rather than pulled from the
//! Windows bindings so the simulated subsystem speaks the same codes.

/// Application name used for config directories
pub const APP_NAME: &str = "mastervol";

/// Default log filter for the command line tool
pub const DEFAULT_LOG_FILTER: &str = "warn";

// MMRESULT values

/// No error
pub const MMSYSERR_NOERROR: u32 = 0;
/// Unspecified error
pub const MMSYSERR_ERROR: u32 = 1;
/// Device ID out of range
pub const MMSYSERR_BADDEVICEID: u32 = 2;
/// Driver failed enable
pub const MMSYSERR_NOTENABLED: u32 = 3;
/// Device already allocated
pub const MMSYSERR_ALLOCATED: u32 = 4;
/// Device handle is invalid
pub const MMSYSERR_INVALHANDLE: u32 = 5;
/// No device driver present
pub const MMSYSERR_NODRIVER: u32 = 6;
/// Memory allocation error
pub const MMSYSERR_NOMEM: u32 = 7;
/// Function isn't supported
pub const MMSYSERR_NOTSUPPORTED: u32 = 8;
/// Invalid flag passed
pub const MMSYSERR_INVALFLAG: u32 = 10;
/// Invalid parameter passed
pub const MMSYSERR_INVALPARAM: u32 = 11;

/// Base of mixer-specific result codes
pub const MIXERR_BASE: u32 = 1024;
/// No line matches the request
pub const MIXERR_INVALLINE: u32 = MIXERR_BASE;
/// No control matches the request
pub const MIXERR_INVALCONTROL: u32 = MIXERR_BASE + 1;
/// Value out of range for the control
pub const MIXERR_INVALVALUE: u32 = MIXERR_BASE + 2;

// Mixer line component types

pub const MIXERLINE_COMPONENTTYPE_DST_FIRST: u32 = 0x0000_0000;
pub const MIXERLINE_COMPONENTTYPE_DST_SPEAKERS: u32 = MIXERLINE_COMPONENTTYPE_DST_FIRST + 4;
pub const MIXERLINE_COMPONENTTYPE_DST_WAVEIN: u32 = MIXERLINE_COMPONENTTYPE_DST_FIRST + 7;

pub const MIXERLINE_COMPONENTTYPE_SRC_FIRST: u32 = 0x0000_1000;
pub const MIXERLINE_COMPONENTTYPE_SRC_LINE: u32 = MIXERLINE_COMPONENTTYPE_SRC_FIRST + 2;
pub const MIXERLINE_COMPONENTTYPE_SRC_MICROPHONE: u32 = MIXERLINE_COMPONENTTYPE_SRC_FIRST + 3;
pub const MIXERLINE_COMPONENTTYPE_SRC_SYNTHESIZER: u32 = MIXERLINE_COMPONENTTYPE_SRC_FIRST + 4;
pub const MIXERLINE_COMPONENTTYPE_SRC_COMPACTDISC: u32 = MIXERLINE_COMPONENTTYPE_SRC_FIRST + 5;
pub const MIXERLINE_COMPONENTTYPE_SRC_WAVEOUT: u32 = MIXERLINE_COMPONENTTYPE_SRC_FIRST + 8;

// Mixer control types

/// Boolean switch with on/off semantics, unit boolean
pub const MIXERCONTROL_CONTROLTYPE_MUTE: u32 = 0x2001_0002;
/// Unsigned fader, 0..=0xFFFF by convention
pub const MIXERCONTROL_CONTROLTYPE_VOLUME: u32 = 0x5003_0001;

// Mixer call flags

/// Open by mixer device identifier
pub const MIXER_OBJECTF_MIXER: u32 = 0x0000_0000;
/// Object argument is an open mixer handle
pub const MIXER_OBJECTF_HMIXER: u32 = 0x8000_0000;
pub const MIXER_GETLINEINFOF_COMPONENTTYPE: u32 = 0x0000_0003;
pub const MIXER_GETLINECONTROLSF_ONEBYTYPE: u32 = 0x0000_0002;
pub const MIXER_GETCONTROLDETAILSF_VALUE: u32 = 0x0000_0000;
pub const MIXER_SETCONTROLDETAILSF_VALUE: u32 = 0x0000_0000;

/// Default mixer device identifier
pub const DEFAULT_MIXER_ID: u32 = 0;

// Waveform output register

/// Full scale of one channel half of the waveform volume register
pub const WAVE_CHANNEL_MAX: u32 = 0xFFFF;

// Endpoint HRESULTs

/// `HRESULT_FROM_WIN32(ERROR_NOT_FOUND)`, returned when no default endpoint exists
pub const E_NOTFOUND: u32 = 0x8007_0490;
