//! Backend selection by capability tier and line selector
//!
//! Pure mapping, no I/O. Every (tier, selector) pair has an outcome:
//!
//! ```text
//!                  │ Modern              │ Legacy
//! ─────────────────┼─────────────────────┼──────────────────────────
//! output           │ endpoint (render)   │ mixer: speakers
//! input            │ endpoint (capture)  │ mixer: microphone
//! wave-out/line-in │ UnsupportedSelector │ mixer: matching source line
//! cd/midi          │ UnsupportedSelector │ mixer: matching source line
//! ```

use crate::constants::*;
use crate::error::{Error, Result};
use crate::protocol::{DataFlow, LineSelector};
use crate::tier::CapabilityTier;

/// Backend chosen for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBackend {
    /// Default endpoint for a data-flow direction
    Endpoint(DataFlow),
    /// Legacy mixer line
    Mixer(MixerTarget),
}

/// Mixer line addressed by component type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerTarget {
    /// Selector the line was derived from
    pub line: LineSelector,
    /// Component-type tag of the line
    pub component_type: u32,
}

impl MixerTarget {
    pub fn for_line(line: LineSelector) -> Self {
        Self {
            line,
            component_type: component_type(line),
        }
    }

    /// Alternate tag for capture mixers that enumerate the microphone
    /// only as the wave-in destination
    pub fn capture_fallback(&self) -> Option<u32> {
        match self.line {
            LineSelector::PrimaryInput => Some(MIXERLINE_COMPONENTTYPE_DST_WAVEIN),
            _ => None,
        }
    }
}

/// Component-type tag of the mixer line behind a selector
pub fn component_type(line: LineSelector) -> u32 {
    match line {
        LineSelector::PrimaryOutput => MIXERLINE_COMPONENTTYPE_DST_SPEAKERS,
        LineSelector::PrimaryInput => MIXERLINE_COMPONENTTYPE_SRC_MICROPHONE,
        LineSelector::LegacyWaveOut => MIXERLINE_COMPONENTTYPE_SRC_WAVEOUT,
        LineSelector::LegacyLineIn => MIXERLINE_COMPONENTTYPE_SRC_LINE,
        LineSelector::LegacyCd => MIXERLINE_COMPONENTTYPE_SRC_COMPACTDISC,
        LineSelector::LegacyMidiSynth => MIXERLINE_COMPONENTTYPE_SRC_SYNTHESIZER,
    }
}

/// Choose exactly one backend for a request
pub fn resolve(tier: CapabilityTier, line: LineSelector) -> Result<ResolvedBackend> {
    match tier {
        CapabilityTier::Modern => match line {
            LineSelector::PrimaryOutput => Ok(ResolvedBackend::Endpoint(DataFlow::Render)),
            LineSelector::PrimaryInput => Ok(ResolvedBackend::Endpoint(DataFlow::Capture)),
            LineSelector::LegacyWaveOut
            | LineSelector::LegacyLineIn
            | LineSelector::LegacyCd
            | LineSelector::LegacyMidiSynth => Err(Error::UnsupportedSelector {
                selector: line,
                tier,
            }),
        },
        CapabilityTier::Legacy => Ok(ResolvedBackend::Mixer(MixerTarget::for_line(line))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_maps_directions() {
        assert_eq!(
            resolve(CapabilityTier::Modern, LineSelector::PrimaryOutput).unwrap(),
            ResolvedBackend::Endpoint(DataFlow::Render)
        );
        assert_eq!(
            resolve(CapabilityTier::Modern, LineSelector::PrimaryInput).unwrap(),
            ResolvedBackend::Endpoint(DataFlow::Capture)
        );
    }

    #[test]
    fn test_resolver_is_total() {
        for tier in [CapabilityTier::Legacy, CapabilityTier::Modern] {
            for line in LineSelector::ALL {
                match resolve(tier, line) {
                    Ok(ResolvedBackend::Endpoint(_)) => {
                        assert_eq!(tier, CapabilityTier::Modern);
                        assert!(!line.is_legacy_only());
                    }
                    Ok(ResolvedBackend::Mixer(target)) => {
                        assert_eq!(tier, CapabilityTier::Legacy);
                        assert_eq!(target.line, line);
                    }
                    Err(Error::UnsupportedSelector { selector, tier: t }) => {
                        assert_eq!(t, CapabilityTier::Modern);
                        assert_eq!(selector, line);
                        assert!(line.is_legacy_only());
                    }
                    Err(other) => panic!("unexpected error {other}"),
                }
            }
        }
    }

    #[test]
    fn test_component_tags_are_distinct() {
        let mut tags: Vec<u32> = LineSelector::ALL.iter().map(|l| component_type(*l)).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), LineSelector::ALL.len());
    }

    #[test]
    fn test_capture_fallback_only_for_input() {
        let input = MixerTarget::for_line(LineSelector::PrimaryInput);
        assert_eq!(input.capture_fallback(), Some(MIXERLINE_COMPONENTTYPE_DST_WAVEIN));

        let output = MixerTarget::for_line(LineSelector::PrimaryOutput);
        assert_eq!(output.capture_fallback(), None);
    }
}
