//! Volume backends
//!
//! Each backend serves the same capability set (set/get volume, set/get
//! mute) over a different OS mechanism. A backend call is one full
//! acquire-use-release cycle: mutations first, then reads.

pub mod endpoint;
pub mod mixer;
pub mod waveout;

pub use endpoint::EndpointBackend;
pub use mixer::{decode_raw, encode_raw, MixerBackend};
pub use waveout::{pack_channels, unpack_channels, WaveOutBackend};

use std::fmt;

use crate::error::Result;
use crate::protocol::{Request, VolumeReport};

/// Backend family, carried in failures for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Per-endpoint volume interface
    Endpoint,
    /// Legacy mixer line controls
    Mixer,
    /// Waveform output register
    WaveOut,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Endpoint => f.write_str("endpoint"),
            Self::Mixer => f.write_str("mixer"),
            Self::WaveOut => f.write_str("waveform"),
        }
    }
}

/// One way of executing a volume/mute request
pub trait VolumeBackend {
    fn kind(&self) -> BackendKind;

    /// Whether a mute control can exist at all on this backend
    fn supports_mute(&self) -> bool {
        true
    }

    /// Run the requested operations.
    ///
    /// On failure nothing observed so far is returned.
    fn execute(&self, request: &Request) -> Result<VolumeReport>;
}
