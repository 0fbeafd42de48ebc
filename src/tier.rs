//! Capability tier of the host audio subsystem

use serde::{Deserialize, Serialize};
use std::fmt;

/// Major version of the first OS release with per-endpoint volume
const MODERN_MIN_MAJOR_VERSION: u32 = 6;

/// Which backend family the host supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    /// Mixer lines and the waveform register only
    Legacy,
    /// Per-endpoint volume interface
    Modern,
}

impl CapabilityTier {
    /// Classify an OS major version
    pub fn from_major_version(major: u32) -> Self {
        if major >= MODERN_MIN_MAJOR_VERSION {
            Self::Modern
        } else {
            Self::Legacy
        }
    }

    /// Probe the running OS once
    #[cfg(windows)]
    pub fn detect() -> Self {
        use windows::Win32::System::SystemInformation::{GetVersionExW, OSVERSIONINFOW};

        let mut info = OSVERSIONINFOW {
            dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
            ..Default::default()
        };
        // Safety: `info` is a properly sized, writable OSVERSIONINFOW
        if let Err(e) = unsafe { GetVersionExW(&mut info) } {
            tracing::warn!("OS version probe failed ({}), assuming legacy tier", e);
        }
        let tier = Self::from_major_version(info.dwMajorVersion);
        tracing::debug!(
            "OS version {}.{} -> {} tier",
            info.dwMajorVersion,
            info.dwMinorVersion,
            tier
        );
        tier
    }

    /// Probe the running OS once
    #[cfg(not(windows))]
    pub fn detect() -> Self {
        Self::Legacy
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Modern => f.write_str("modern"),
        }
    }
}

/// Tier choice from config or command line
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TierPreference {
    /// Detect from the OS
    #[default]
    Auto,
    Legacy,
    Modern,
}

impl TierPreference {
    /// Resolve to a concrete tier, probing the OS only for `Auto`
    pub fn resolve(self) -> CapabilityTier {
        self.resolve_with(CapabilityTier::detect)
    }

    pub fn resolve_with(self, detect: impl FnOnce() -> CapabilityTier) -> CapabilityTier {
        match self {
            Self::Auto => detect(),
            Self::Legacy => CapabilityTier::Legacy,
            Self::Modern => CapabilityTier::Modern,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_version() {
        assert_eq!(CapabilityTier::from_major_version(5), CapabilityTier::Legacy);
        assert_eq!(CapabilityTier::from_major_version(4), CapabilityTier::Legacy);
        assert_eq!(CapabilityTier::from_major_version(6), CapabilityTier::Modern);
        assert_eq!(CapabilityTier::from_major_version(10), CapabilityTier::Modern);
        // Zeroed version info from a failed probe
        assert_eq!(CapabilityTier::from_major_version(0), CapabilityTier::Legacy);
    }

    #[test]
    fn test_preference_override_skips_detection() {
        let forced = TierPreference::Legacy.resolve_with(|| panic!("must not probe"));
        assert_eq!(forced, CapabilityTier::Legacy);

        let auto = TierPreference::Auto.resolve_with(|| CapabilityTier::Modern);
        assert_eq!(auto, CapabilityTier::Modern);
    }
}
