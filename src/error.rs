//! Error types for volume control
use std::fmt;
use thiserror::Error;

use crate::backend::BackendKind;
use crate::constants::*;
use crate::protocol::LineSelector;
use crate::tier::CapabilityTier;

/// Result type for volume operations
pub type Result<T> = std::result::Result<T, Error>;

/// Sub-control of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Volume,
    Mute,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Volume => f.write_str("volume"),
            Self::Mute => f.write_str("mute"),
        }
    }
}

/// Volume control errors
#[derive(Debug, Error)]
pub enum Error {
    /// Line selector has no meaning in the resolved tier
    #[error("line '{selector}' is not supported by the {tier} backend tier")]
    UnsupportedSelector {
        selector: LineSelector,
        tier: CapabilityTier,
    },

    /// No default device or line could be resolved
    #[error("no {target} device available{}", fmt_code(.code))]
    DeviceUnavailable { target: String, code: Option<u32> },

    /// The line exists but lacks the requested control
    #[error("{target} has no {control} control{}", fmt_code(.code))]
    ControlUnavailable {
        control: ControlKind,
        target: String,
        code: Option<u32>,
    },

    /// Opaque OS failure, code preserved as returned
    #[error("{backend} backend failed with code 0x{code:08X}")]
    BackendFailure { backend: BackendKind, code: u32 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_code(code: &Option<u32>) -> String {
    match code {
        Some(code) => format!(" (code 0x{:08X})", code),
        None => String::new(),
    }
}

impl Error {
    /// Classify a mixer or waveform MMRESULT without rewriting it
    pub fn from_mmresult(
        backend: BackendKind,
        code: u32,
        target: &str,
        control: ControlKind,
    ) -> Self {
        match code {
            MIXERR_INVALLINE | MMSYSERR_BADDEVICEID | MMSYSERR_NODRIVER => {
                Self::DeviceUnavailable {
                    target: target.to_string(),
                    code: Some(code),
                }
            }
            MIXERR_INVALCONTROL => Self::ControlUnavailable {
                control,
                target: target.to_string(),
                code: Some(code),
            },
            _ => Self::BackendFailure { backend, code },
        }
    }

    /// Raw OS code attached to this error, if any
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::DeviceUnavailable { code, .. } | Self::ControlUnavailable { code, .. } => *code,
            Self::BackendFailure { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Missing control, as opposed to a device or OS failure
    pub fn is_control_unavailable(&self) -> bool {
        matches!(self, Self::ControlUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmresult_classification() {
        let err = Error::from_mmresult(
            BackendKind::Mixer,
            MIXERR_INVALLINE,
            "speakers",
            ControlKind::Volume,
        );
        assert!(matches!(err, Error::DeviceUnavailable { .. }));
        assert_eq!(err.code(), Some(MIXERR_INVALLINE));

        let err = Error::from_mmresult(
            BackendKind::Mixer,
            MIXERR_INVALCONTROL,
            "speakers",
            ControlKind::Mute,
        );
        assert!(err.is_control_unavailable());
        assert_eq!(err.code(), Some(MIXERR_INVALCONTROL));

        let err = Error::from_mmresult(
            BackendKind::Mixer,
            MMSYSERR_ALLOCATED,
            "speakers",
            ControlKind::Volume,
        );
        assert!(matches!(
            err,
            Error::BackendFailure {
                code: MMSYSERR_ALLOCATED,
                ..
            }
        ));
    }

    #[test]
    fn test_display_keeps_code() {
        let err = Error::BackendFailure {
            backend: BackendKind::Endpoint,
            code: 0x8889_0004,
        };
        assert_eq!(
            err.to_string(),
            "endpoint backend failed with code 0x88890004"
        );

        let err = Error::ControlUnavailable {
            control: ControlKind::Mute,
            target: "waveform output".into(),
            code: None,
        };
        assert_eq!(err.to_string(), "waveform output has no mute control");
    }
}
