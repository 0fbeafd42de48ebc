//! Legacy mixer backend
//!
//! Controls are addressed in three hops:
//!
//! ```text
//! line (component type) ──> line controls (control type, one) ──> details
//! ```
//!
//! Volume controls hold a bounded unsigned integer; mute controls hold a
//! boolean. Both are looked up separately on the same line.

use crate::backend::{BackendKind, VolumeBackend};
use crate::constants::*;
use crate::error::{ControlKind, Error, Result};
use crate::platform::{MixerControl, MixerDevice, MixerLine, MixerSystem, MmError, MmResult};
use crate::protocol::{clamp_fraction, Request, VolumeReport};
use crate::resolver::MixerTarget;

/// Raw control value for a normalized fraction, rounded to the nearest unit
pub fn encode_raw(fraction: f32, minimum: u32, maximum: u32) -> u32 {
    if maximum <= minimum {
        return minimum;
    }
    let span = f64::from(maximum - minimum);
    let offset = (f64::from(clamp_fraction(fraction)) * span).round() as u32;
    minimum + offset.min(maximum - minimum)
}

/// Normalized fraction for a raw control value, measured from `minimum`
pub fn decode_raw(raw: u32, minimum: u32, maximum: u32) -> f32 {
    if maximum <= minimum {
        return 0.0;
    }
    let span = f64::from(maximum - minimum);
    let offset = f64::from(raw.clamp(minimum, maximum) - minimum);
    (offset / span) as f32
}

/// Volume/mute of one mixer line
pub struct MixerBackend<'a> {
    system: &'a dyn MixerSystem,
    target: MixerTarget,
}

impl<'a> MixerBackend<'a> {
    pub fn new(system: &'a dyn MixerSystem, target: MixerTarget) -> Self {
        Self { system, target }
    }

    pub fn target(&self) -> MixerTarget {
        self.target
    }

    fn error(&self, err: MmError, control: ControlKind) -> Error {
        Error::from_mmresult(
            BackendKind::Mixer,
            err.0,
            &format!("{} mixer line", self.target.line),
            control,
        )
    }

    fn locate_on(
        &self,
        mixer: &dyn MixerDevice,
        component_type: u32,
        control_type: u32,
    ) -> MmResult<(MixerLine, MixerControl)> {
        let line = mixer.line_by_component(component_type)?;
        let control = mixer.control_by_type(&line, control_type)?;
        tracing::debug!(
            "Mixer line '{}' (id {}): control {} range [{}, {}]",
            line.name,
            line.line_id,
            control.control_id,
            control.minimum,
            control.maximum
        );
        Ok((line, control))
    }

    /// Find `control_type` on the target line
    fn locate(
        &self,
        mixer: &dyn MixerDevice,
        control_type: u32,
        kind: ControlKind,
    ) -> Result<MixerControl> {
        let located = match self.locate_on(mixer, self.target.component_type, control_type) {
            Err(MmError(MIXERR_INVALCONTROL)) => match self.target.capture_fallback() {
                Some(alternate) => self.locate_capture_fallback(mixer, alternate, control_type),
                None => Err(MmError(MIXERR_INVALCONTROL)),
            },
            other => other,
        };
        located
            .map(|(_, control)| control)
            .map_err(|e| self.error(e, kind))
    }

    /// Compatibility shim: some capture mixers enumerate the microphone
    /// source without controls and expose them on the wave-in destination.
    /// Retried once, only after an invalid-control result; a failed retry
    /// reports the original invalid-control code.
    fn locate_capture_fallback(
        &self,
        mixer: &dyn MixerDevice,
        alternate: u32,
        control_type: u32,
    ) -> MmResult<(MixerLine, MixerControl)> {
        tracing::warn!(
            "No control 0x{:08X} on {} line, retrying on wave-in destination",
            control_type,
            self.target.line
        );
        self.locate_on(mixer, alternate, control_type).map_err(|e| {
            tracing::debug!("Wave-in retry failed: {}", e);
            MmError(MIXERR_INVALCONTROL)
        })
    }
}

impl VolumeBackend for MixerBackend<'_> {
    fn kind(&self) -> BackendKind {
        BackendKind::Mixer
    }

    fn execute(&self, request: &Request) -> Result<VolumeReport> {
        let ops = request.operations;
        let mixer = self
            .system
            .open()
            .map_err(|e| self.error(e, ControlKind::Volume))?;
        let mut report = VolumeReport::default();

        if ops.touches_volume() {
            let control = self.locate(&*mixer, MIXERCONTROL_CONTROLTYPE_VOLUME, ControlKind::Volume)?;

            if ops.sets_volume() {
                let raw = encode_raw(request.volume, control.minimum, control.maximum);
                tracing::debug!("Writing raw volume {} to {} line", raw, self.target.line);
                mixer
                    .set_unsigned_value(&control, raw)
                    .map_err(|e| self.error(e, ControlKind::Volume))?;
            }
            if ops.gets_volume() {
                let raw = mixer
                    .unsigned_value(&control)
                    .map_err(|e| self.error(e, ControlKind::Volume))?;
                report.volume = Some(decode_raw(raw, control.minimum, control.maximum));
            }
        }

        if ops.touches_mute() {
            let control = self.locate(&*mixer, MIXERCONTROL_CONTROLTYPE_MUTE, ControlKind::Mute)?;

            if ops.sets_mute() {
                mixer
                    .set_boolean_value(&control, request.mute_target)
                    .map_err(|e| self.error(e, ControlKind::Mute))?;
            }
            if ops.gets_mute() {
                let muted = mixer
                    .boolean_value(&control)
                    .map_err(|e| self.error(e, ControlKind::Mute))?;
                report.muted = Some(muted);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::sim::{MixerStep, SimAudio, SimFader, SimLine};
    use crate::protocol::LineSelector;
    use proptest::prelude::*;

    fn backend(audio: &SimAudio, line: LineSelector) -> MixerBackend<'_> {
        MixerBackend::new(audio, MixerTarget::for_line(line))
    }

    #[test]
    fn test_encode_decode_bounds() {
        assert_eq!(encode_raw(0.0, 0, 65535), 0);
        assert_eq!(encode_raw(1.0, 0, 65535), 65535);
        assert_eq!(encode_raw(0.5, 100, 200), 150);
        assert_eq!(encode_raw(2.0, 100, 200), 200);
        assert_eq!(decode_raw(150, 100, 200), 0.5);
        assert_eq!(decode_raw(50, 100, 200), 0.0);
        // Degenerate range
        assert_eq!(encode_raw(0.7, 5, 5), 5);
        assert_eq!(decode_raw(5, 5, 5), 0.0);
    }

    #[test]
    fn test_volume_scaled_into_line_range() {
        let audio = SimAudio::new().with_line(
            SimLine::new(MIXERLINE_COMPONENTTYPE_DST_SPEAKERS, "Speakers")
                .with_fader(Some(SimFader::new(1000, 3000, 1000))),
        );

        let report = backend(&audio, LineSelector::PrimaryOutput)
            .execute(&Request::default().with_volume(0.25).read_volume())
            .unwrap();

        let line = audio.line(MIXERLINE_COMPONENTTYPE_DST_SPEAKERS).unwrap();
        assert_eq!(line.volume.unwrap().value, 1500);
        assert_eq!(report.volume, Some(0.25));
        assert_eq!(audio.open_handles(), 0);
    }

    #[test]
    fn test_set_mute_then_get_mute() {
        let audio = SimAudio::new();
        let mixer = backend(&audio, LineSelector::PrimaryOutput);

        let report = mixer.execute(&Request::default().with_mute(true)).unwrap();
        assert_eq!(report.muted, None);

        let report = mixer.execute(&Request::default().read_mute()).unwrap();
        assert_eq!(report.muted, Some(true));
    }

    #[test]
    fn test_missing_mute_control_is_reported() {
        let audio = SimAudio::new();

        let err = backend(&audio, LineSelector::LegacyWaveOut)
            .execute(&Request::default().read_volume().read_mute())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ControlUnavailable {
                control: ControlKind::Mute,
                code: Some(MIXERR_INVALCONTROL),
                ..
            }
        ));
        assert_eq!(audio.open_handles(), 0);
    }

    #[test]
    fn test_volume_only_request_ignores_missing_mute() {
        let audio = SimAudio::new();

        let report = backend(&audio, LineSelector::LegacyWaveOut)
            .execute(&Request::default().read_volume())
            .unwrap();

        assert!(report.volume.is_some());
        assert_eq!(report.muted, None);
    }

    #[test]
    fn test_missing_line_is_device_unavailable() {
        let audio = SimAudio::new().without_line(MIXERLINE_COMPONENTTYPE_SRC_COMPACTDISC);

        let err = backend(&audio, LineSelector::LegacyCd)
            .execute(&Request::default().read_volume())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::DeviceUnavailable {
                code: Some(MIXERR_INVALLINE),
                ..
            }
        ));
    }

    #[test]
    fn test_capture_quirk_falls_back_to_wave_in() {
        let audio = SimAudio::new().with_capture_quirk();

        let report = backend(&audio, LineSelector::PrimaryInput)
            .execute(&Request::default().with_volume(1.0).read_volume().read_mute())
            .unwrap();

        assert_eq!(report.volume, Some(1.0));
        assert_eq!(report.muted, Some(false));
        let wave_in = audio.line(MIXERLINE_COMPONENTTYPE_DST_WAVEIN).unwrap();
        assert_eq!(wave_in.volume.unwrap().value, WAVE_CHANNEL_MAX);
    }

    #[test]
    fn test_failed_fallback_keeps_missing_control() {
        let audio = SimAudio::new()
            .with_line(
                SimLine::new(MIXERLINE_COMPONENTTYPE_SRC_MICROPHONE, "Microphone").with_fader(None),
            )
            .without_line(MIXERLINE_COMPONENTTYPE_DST_WAVEIN);

        let err = backend(&audio, LineSelector::PrimaryInput)
            .execute(&Request::default().read_volume())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ControlUnavailable {
                control: ControlKind::Volume,
                code: Some(MIXERR_INVALCONTROL),
                ..
            }
        ));
        assert_eq!(audio.open_handles(), 0);
    }

    #[test]
    fn test_fallback_write_failure_releases_mixer() {
        let audio = SimAudio::new()
            .with_capture_quirk()
            .fail_mixer(MixerStep::SetDetails, MMSYSERR_ERROR);

        let err = backend(&audio, LineSelector::PrimaryInput)
            .execute(&Request::default().with_volume(0.3).read_volume())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::BackendFailure {
                backend: BackendKind::Mixer,
                code: MMSYSERR_ERROR
            }
        ));
        assert_eq!(audio.open_handles(), 0);
        assert_eq!(audio.release_log(), vec!["mixer"]);
    }

    #[test]
    fn test_no_fallback_for_output_lines() {
        let audio = SimAudio::new()
            .with_line(
                SimLine::new(MIXERLINE_COMPONENTTYPE_DST_SPEAKERS, "Speakers").with_fader(None),
            )
            .with_line(SimLine::new(MIXERLINE_COMPONENTTYPE_DST_WAVEIN, "Recording Control"));

        let err = backend(&audio, LineSelector::PrimaryOutput)
            .execute(&Request::default().read_volume())
            .unwrap_err();

        assert!(err.is_control_unavailable());
    }

    #[test]
    fn test_codes_surface_verbatim() {
        let audio = SimAudio::new().fail_mixer(MixerStep::SetDetails, MMSYSERR_ALLOCATED);

        let err = backend(&audio, LineSelector::PrimaryOutput)
            .execute(&Request::default().with_volume(0.4).read_volume())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::BackendFailure {
                backend: BackendKind::Mixer,
                code: MMSYSERR_ALLOCATED
            }
        ));
        assert_eq!(audio.open_handles(), 0);
        assert_eq!(audio.release_log(), vec!["mixer"]);
    }

    #[test]
    fn test_open_failure() {
        let audio = SimAudio::new().fail_mixer(MixerStep::Open, MMSYSERR_NODRIVER);

        let err = backend(&audio, LineSelector::PrimaryOutput)
            .execute(&Request::default().read_volume())
            .unwrap_err();

        assert_eq!(err.code(), Some(MMSYSERR_NODRIVER));
        assert!(matches!(err, Error::DeviceUnavailable { .. }));
    }

    proptest! {
        #[test]
        fn prop_raw_round_trip_within_one_unit(
            f in 0.0f32..=1.0,
            minimum in 0u32..100_000,
            span in 1u32..100_000,
        ) {
            let maximum = minimum + span;
            let raw = encode_raw(f, minimum, maximum);
            prop_assert!(raw >= minimum && raw <= maximum);
            let decoded = decode_raw(raw, minimum, maximum);
            prop_assert!((decoded - f).abs() <= 1.0 / span as f32 + 1e-6);
        }

        #[test]
        fn prop_decode_then_encode_is_stable(
            minimum in 0u32..1000,
            span in 1u32..70_000,
            pick in 0.0f64..=1.0,
        ) {
            let maximum = minimum + span;
            let raw = minimum + (pick * f64::from(span)) as u32;
            let fraction = decode_raw(raw, minimum, maximum);
            prop_assert_eq!(encode_raw(fraction, minimum, maximum), raw);
        }
    }
}
