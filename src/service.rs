//! Request dispatch
//!
//! Picks a backend for each request, runs it, and for legacy hosts drives
//! the waveform register alongside when asked.

use crate::backend::{EndpointBackend, MixerBackend, VolumeBackend, WaveOutBackend};
use crate::error::Result;
use crate::platform::AudioHost;
use crate::protocol::{LineSelector, Operations, Request, VolumeReport};
use crate::resolver::{resolve, ResolvedBackend};
use crate::tier::CapabilityTier;

/// Volume control for one host and tier
pub struct VolumeService {
    tier: CapabilityTier,
    host: AudioHost,
}

impl VolumeService {
    pub fn new(tier: CapabilityTier, host: AudioHost) -> Self {
        Self { tier, host }
    }

    /// Service over the running OS
    #[cfg(windows)]
    pub fn system(tier: CapabilityTier) -> Self {
        Self::new(tier, AudioHost::system())
    }

    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// Backend serving `line` on this tier
    pub fn backend_for(&self, line: LineSelector) -> Result<Box<dyn VolumeBackend + '_>> {
        let backend: Box<dyn VolumeBackend + '_> = match resolve(self.tier, line)? {
            ResolvedBackend::Endpoint(flow) => {
                Box::new(EndpointBackend::new(&*self.host.endpoints, flow))
            }
            ResolvedBackend::Mixer(target) => {
                Box::new(MixerBackend::new(&*self.host.mixer, target))
            }
        };
        Ok(backend)
    }

    /// Execute a request end to end
    pub fn execute(&self, request: &Request) -> Result<VolumeReport> {
        let request = request.normalized();
        let backend = self.backend_for(request.line)?;
        tracing::debug!(
            "Dispatching ops 0x{:02X} on {} line to {} backend",
            request.operations.as_byte(),
            request.line,
            backend.kind()
        );

        let mut report = backend.execute(&request)?;

        if request.wave_register {
            report.wave_volume = self.execute_wave_register(&request)?;
        }

        tracing::info!(
            "{} line: volume={:?} muted={:?} wave={:?}",
            request.line,
            report.volume,
            report.muted,
            report.wave_volume
        );
        Ok(report)
    }

    /// Volume-only side-channel on the waveform register
    fn execute_wave_register(&self, request: &Request) -> Result<Option<f32>> {
        if self.tier != CapabilityTier::Legacy {
            tracing::warn!("Waveform register is only driven on the legacy tier, ignoring");
            return Ok(None);
        }

        let operations = Operations::new()
            .set_volume(request.operations.sets_volume())
            .get_volume(request.operations.gets_volume());
        if operations.is_empty() {
            return Ok(None);
        }

        let wave_request = Request {
            operations,
            ..request.clone()
        };
        let report = WaveOutBackend::new(&*self.host.wave_out).execute(&wave_request)?;
        Ok(report.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendKind;
    use crate::constants::*;
    use crate::error::Error;
    use crate::platform::sim::{EndpointStep, MixerStep, SimAudio, SimFader, SimLine};
    use crate::protocol::DataFlow;
    use proptest::prelude::*;

    fn service(tier: CapabilityTier, audio: &SimAudio) -> VolumeService {
        VolumeService::new(tier, audio.host())
    }

    #[test]
    fn test_modern_set_and_get_volume() {
        let audio = SimAudio::new();
        let svc = service(CapabilityTier::Modern, &audio);

        let report = svc
            .execute(
                &Request::new(LineSelector::PrimaryOutput)
                    .with_volume(0.5)
                    .read_volume(),
            )
            .unwrap();

        assert!((report.volume.unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(report.muted, None);
        assert_eq!(report.wave_volume, None);
    }

    #[test]
    fn test_legacy_mute_round_trip() {
        let audio = SimAudio::new();
        let svc = service(CapabilityTier::Legacy, &audio);

        svc.execute(&Request::new(LineSelector::PrimaryOutput).with_mute(true))
            .unwrap();
        let report = svc
            .execute(&Request::new(LineSelector::PrimaryOutput).read_mute())
            .unwrap();

        assert_eq!(report.muted, Some(true));
        assert_eq!(audio.open_handles(), 0);
    }

    #[test]
    fn test_modern_rejects_legacy_lines() {
        let audio = SimAudio::new();
        let svc = service(CapabilityTier::Modern, &audio);

        let err = svc
            .execute(&Request::new(LineSelector::LegacyCd).read_volume())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::UnsupportedSelector {
                selector: LineSelector::LegacyCd,
                tier: CapabilityTier::Modern
            }
        ));
        assert_eq!(audio.release_log(), Vec::<&str>::new());
    }

    #[test]
    fn test_backend_choice() {
        let audio = SimAudio::new();
        let modern = service(CapabilityTier::Modern, &audio);
        let legacy = service(CapabilityTier::Legacy, &audio);

        assert_eq!(
            modern.backend_for(LineSelector::PrimaryInput).unwrap().kind(),
            BackendKind::Endpoint
        );
        assert_eq!(
            legacy.backend_for(LineSelector::PrimaryInput).unwrap().kind(),
            BackendKind::Mixer
        );
        assert_eq!(
            legacy.backend_for(LineSelector::LegacyMidiSynth).unwrap().kind(),
            BackendKind::Mixer
        );
    }

    #[test]
    fn test_out_of_range_request_is_clamped_before_dispatch() {
        let audio = SimAudio::new();
        let svc = service(CapabilityTier::Modern, &audio);

        let loud = Request {
            operations: Operations::new().set_volume(true),
            volume: 1.5,
            ..Default::default()
        };
        svc.execute(&loud).unwrap();
        assert_eq!(audio.endpoint(DataFlow::Render).unwrap().volume, 1.0);

        svc.execute(&Request::default().with_volume_percent(-5.0))
            .unwrap();
        assert_eq!(audio.endpoint(DataFlow::Render).unwrap().volume, 0.0);
    }

    #[test]
    fn test_wave_register_side_channel() {
        let audio = SimAudio::new();
        let svc = service(CapabilityTier::Legacy, &audio);

        let report = svc
            .execute(
                &Request::new(LineSelector::PrimaryOutput)
                    .with_volume(0.0)
                    .read_volume()
                    .read_mute()
                    .with_wave_register(true),
            )
            .unwrap();

        assert_eq!(report.volume, Some(0.0));
        assert_eq!(report.muted, Some(false));
        assert_eq!(report.wave_volume, Some(0.0));
        assert_eq!(audio.wave_register(), Some(0));
    }

    #[test]
    fn test_wave_register_ignored_on_modern_tier() {
        let audio = SimAudio::new();
        let svc = service(CapabilityTier::Modern, &audio);

        let report = svc
            .execute(
                &Request::default()
                    .with_volume(0.2)
                    .read_volume()
                    .with_wave_register(true),
            )
            .unwrap();

        assert_eq!(report.wave_volume, None);
        assert_eq!(audio.wave_register(), Some(0xFFFF_FFFF));
    }

    #[test]
    fn test_wave_failure_fails_request() {
        let audio = SimAudio::new().with_wave_register(None);
        let svc = service(CapabilityTier::Legacy, &audio);

        let err = svc
            .execute(&Request::default().read_volume().with_wave_register(true))
            .unwrap_err();

        assert_eq!(err.code(), Some(MMSYSERR_NODRIVER));
    }

    #[test]
    fn test_endpoint_failure_returns_no_partial_report() {
        let audio = SimAudio::new().fail_endpoint(EndpointStep::GetMute, 0x8000_FFFF);
        let svc = service(CapabilityTier::Modern, &audio);

        let result = svc.execute(&Request::default().read_volume().read_mute());

        assert!(result.is_err());
        assert_eq!(audio.open_handles(), 0);
    }

    #[test]
    fn test_legacy_line_in_with_narrow_range() {
        let audio = SimAudio::new().with_line(
            SimLine::new(MIXERLINE_COMPONENTTYPE_SRC_LINE, "Line In")
                .with_fader(Some(SimFader::new(0, 31, 0))),
        );
        let svc = service(CapabilityTier::Legacy, &audio);

        let report = svc
            .execute(
                &Request::new(LineSelector::LegacyLineIn)
                    .with_volume_percent(50.0)
                    .read_volume(),
            )
            .unwrap();

        let volume = report.volume.unwrap();
        assert!((volume - 0.5).abs() <= 1.0 / 31.0);
    }

    #[test]
    fn test_legacy_input_through_capture_quirk() {
        let audio = SimAudio::new().with_capture_quirk();
        let svc = service(CapabilityTier::Legacy, &audio);

        svc.execute(&Request::new(LineSelector::PrimaryInput).with_mute(true))
            .unwrap();
        let report = svc
            .execute(
                &Request::new(LineSelector::PrimaryInput)
                    .with_volume(0.0)
                    .read_volume()
                    .read_mute(),
            )
            .unwrap();

        assert_eq!(report.volume, Some(0.0));
        assert_eq!(report.muted, Some(true));
        let wave_in = audio.line(MIXERLINE_COMPONENTTYPE_DST_WAVEIN).unwrap();
        assert_eq!(wave_in.volume.unwrap().value, 0);
        assert_eq!(wave_in.mute, Some(true));
        assert_eq!(audio.open_handles(), 0);
    }

    #[test]
    fn test_legacy_input_fallback_failure_is_reported() {
        let audio = SimAudio::new()
            .with_capture_quirk()
            .fail_mixer(MixerStep::SetDetails, MMSYSERR_NOMEM);
        let svc = service(CapabilityTier::Legacy, &audio);

        let err = svc
            .execute(&Request::new(LineSelector::PrimaryInput).with_mute(true))
            .unwrap_err();

        assert_eq!(err.code(), Some(MMSYSERR_NOMEM));
        assert_eq!(audio.open_handles(), 0);
        assert_eq!(audio.release_log(), vec!["mixer"]);
    }

    proptest! {
        #[test]
        fn prop_clamped_percent_never_leaves_range(percent in -1000.0f32..1000.0) {
            let audio = SimAudio::new();
            let svc = service(CapabilityTier::Modern, &audio);
            svc.execute(&Request::default().with_volume_percent(percent)).unwrap();
            let stored = audio.endpoint(DataFlow::Render).unwrap().volume;
            prop_assert!((0.0..=1.0).contains(&stored));
        }
    }
}
