//! In-memory audio subsystem
//!
//! Implements every seam trait over shared state so backends can be driven
//! without an OS mixer. Faults can be injected at any step, and every
//! acquired handle is counted so release on failure paths is observable.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::BackendKind;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::platform::{
    AudioHost, EndpointSystem, EndpointVolume, MixerControl, MixerDevice, MixerLine, MixerSystem,
    MmError, MmResult, WaveOutSystem,
};
use crate::protocol::DataFlow;

/// Steps of an endpoint session that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStep {
    Enumerate,
    DefaultDevice,
    Activate,
    SetVolume,
    GetVolume,
    SetMute,
    GetMute,
}

/// Mixer calls that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerStep {
    Open,
    LineInfo,
    LineControls,
    GetDetails,
    SetDetails,
}

/// Simulated endpoint state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimEndpoint {
    pub volume: f32,
    pub muted: bool,
}

/// Bounded unsigned fader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimFader {
    pub minimum: u32,
    pub maximum: u32,
    pub value: u32,
}

impl SimFader {
    pub fn new(minimum: u32, maximum: u32, value: u32) -> Self {
        Self {
            minimum,
            maximum,
            value,
        }
    }
}

/// Simulated mixer line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimLine {
    pub component_type: u32,
    pub line_id: u32,
    pub name: String,
    pub volume: Option<SimFader>,
    pub mute: Option<bool>,
}

impl SimLine {
    pub fn new(component_type: u32, name: &str) -> Self {
        Self {
            component_type,
            line_id: component_type,
            name: name.to_string(),
            volume: Some(SimFader::new(0, WAVE_CHANNEL_MAX, WAVE_CHANNEL_MAX / 2)),
            mute: Some(false),
        }
    }

    pub fn with_fader(mut self, fader: Option<SimFader>) -> Self {
        self.volume = fader;
        self
    }

    pub fn with_mute(mut self, mute: Option<bool>) -> Self {
        self.mute = mute;
        self
    }

    fn volume_control_id(&self) -> u32 {
        self.line_id * 16 + 1
    }

    fn mute_control_id(&self) -> u32 {
        self.line_id * 16 + 2
    }
}

#[derive(Debug, Default)]
struct SimState {
    endpoints: HashMap<DataFlow, SimEndpoint>,
    endpoint_fault: Option<(EndpointStep, u32)>,
    lines: Vec<SimLine>,
    mixer_fault: Option<(MixerStep, u32)>,
    wave_register: Option<u32>,
    open_handles: usize,
    release_log: Vec<&'static str>,
}

/// Shared handle to a simulated subsystem
#[derive(Debug, Clone, Default)]
pub struct SimAudio {
    state: Arc<Mutex<SimState>>,
}

impl SimAudio {
    /// Both endpoints present, a full set of mixer lines, waveform device 0
    pub fn new() -> Self {
        let audio = Self::empty()
            .with_endpoint(DataFlow::Render, 0.5, false)
            .with_endpoint(DataFlow::Capture, 0.5, false)
            .with_line(SimLine::new(MIXERLINE_COMPONENTTYPE_DST_SPEAKERS, "Speakers"))
            .with_line(SimLine::new(MIXERLINE_COMPONENTTYPE_SRC_MICROPHONE, "Microphone"))
            .with_line(SimLine::new(MIXERLINE_COMPONENTTYPE_SRC_WAVEOUT, "Wave").with_mute(None))
            .with_line(SimLine::new(MIXERLINE_COMPONENTTYPE_SRC_LINE, "Line In"))
            .with_line(SimLine::new(MIXERLINE_COMPONENTTYPE_SRC_COMPACTDISC, "CD Audio"))
            .with_line(SimLine::new(MIXERLINE_COMPONENTTYPE_SRC_SYNTHESIZER, "SW Synth"));
        audio.state.lock().wave_register = Some(0xFFFF_FFFF);
        audio
    }

    /// Nothing present at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_endpoint(self, flow: DataFlow, volume: f32, muted: bool) -> Self {
        self.state
            .lock()
            .endpoints
            .insert(flow, SimEndpoint { volume, muted });
        self
    }

    pub fn without_endpoint(self, flow: DataFlow) -> Self {
        self.state.lock().endpoints.remove(&flow);
        self
    }

    /// Add or replace the line with the same component type
    pub fn with_line(self, line: SimLine) -> Self {
        {
            let mut state = self.state.lock();
            state
                .lines
                .retain(|l| l.component_type != line.component_type);
            state.lines.push(line);
        }
        self
    }

    pub fn without_line(self, component_type: u32) -> Self {
        self.state
            .lock()
            .lines
            .retain(|l| l.component_type != component_type);
        self
    }

    /// Capture mixer that exposes no controls on the microphone source and
    /// keeps them on the wave-in destination instead
    pub fn with_capture_quirk(self) -> Self {
        self.with_line(
            SimLine::new(MIXERLINE_COMPONENTTYPE_SRC_MICROPHONE, "Microphone")
                .with_fader(None)
                .with_mute(None),
        )
        .with_line(SimLine::new(MIXERLINE_COMPONENTTYPE_DST_WAVEIN, "Recording Control"))
    }

    pub fn with_wave_register(self, packed: Option<u32>) -> Self {
        self.state.lock().wave_register = packed;
        self
    }

    pub fn fail_endpoint(self, step: EndpointStep, code: u32) -> Self {
        self.state.lock().endpoint_fault = Some((step, code));
        self
    }

    pub fn fail_mixer(self, step: MixerStep, code: u32) -> Self {
        self.state.lock().mixer_fault = Some((step, code));
        self
    }

    pub fn endpoint(&self, flow: DataFlow) -> Option<SimEndpoint> {
        self.state.lock().endpoints.get(&flow).copied()
    }

    pub fn line(&self, component_type: u32) -> Option<SimLine> {
        self.state
            .lock()
            .lines
            .iter()
            .find(|l| l.component_type == component_type)
            .cloned()
    }

    pub fn wave_register(&self) -> Option<u32> {
        self.state.lock().wave_register
    }

    /// Handles acquired and not yet released
    pub fn open_handles(&self) -> usize {
        self.state.lock().open_handles
    }

    /// Handle names in release order
    pub fn release_log(&self) -> Vec<&'static str> {
        self.state.lock().release_log.clone()
    }

    /// Host whose three subsystems share this state
    pub fn host(&self) -> AudioHost {
        AudioHost::new(
            Box::new(self.clone()),
            Box::new(self.clone()),
            Box::new(self.clone()),
        )
    }

    fn endpoint_fault(&self, step: EndpointStep) -> Result<()> {
        match self.state.lock().endpoint_fault {
            Some((failing, code)) if failing == step => Err(Error::BackendFailure {
                backend: BackendKind::Endpoint,
                code,
            }),
            _ => Ok(()),
        }
    }

    fn mixer_fault(&self, step: MixerStep) -> MmResult<()> {
        match self.state.lock().mixer_fault {
            Some((failing, code)) if failing == step => Err(MmError(code)),
            _ => Ok(()),
        }
    }

    fn acquire(&self, name: &'static str) -> SimHandle {
        self.state.lock().open_handles += 1;
        SimHandle {
            audio: self.clone(),
            name,
        }
    }
}

/// Counted handle, released on drop
struct SimHandle {
    audio: SimAudio,
    name: &'static str,
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        let mut state = self.audio.state.lock();
        state.open_handles -= 1;
        state.release_log.push(self.name);
    }
}

// Endpoint

struct SimEndpointSession {
    _device: SimHandle,
    _interface: SimHandle,
    _enumerator: SimHandle,
    audio: SimAudio,
    flow: DataFlow,
}

impl SimEndpointSession {
    fn update(&self, apply: impl FnOnce(&mut SimEndpoint)) -> Result<()> {
        let mut state = self.audio.state.lock();
        let endpoint = state
            .endpoints
            .get_mut(&self.flow)
            .ok_or(Error::BackendFailure {
                backend: BackendKind::Endpoint,
                code: E_NOTFOUND,
            })?;
        apply(endpoint);
        Ok(())
    }

    fn current(&self) -> Result<SimEndpoint> {
        self.audio
            .state
            .lock()
            .endpoints
            .get(&self.flow)
            .copied()
            .ok_or(Error::BackendFailure {
                backend: BackendKind::Endpoint,
                code: E_NOTFOUND,
            })
    }
}

impl EndpointSystem for SimAudio {
    fn open(&self, flow: DataFlow) -> Result<Box<dyn EndpointVolume + '_>> {
        self.endpoint_fault(EndpointStep::Enumerate)?;
        let enumerator = self.acquire("enumerator");

        self.endpoint_fault(EndpointStep::DefaultDevice)?;
        if !self.state.lock().endpoints.contains_key(&flow) {
            return Err(Error::DeviceUnavailable {
                target: format!("{} endpoint", flow),
                code: Some(E_NOTFOUND),
            });
        }
        let device = self.acquire("device");

        self.endpoint_fault(EndpointStep::Activate)?;
        let interface = self.acquire("interface");

        Ok(Box::new(SimEndpointSession {
            _device: device,
            _interface: interface,
            _enumerator: enumerator,
            audio: self.clone(),
            flow,
        }))
    }
}

impl EndpointVolume for SimEndpointSession {
    fn volume(&self) -> Result<f32> {
        self.audio.endpoint_fault(EndpointStep::GetVolume)?;
        Ok(self.current()?.volume)
    }

    fn set_volume(&self, level: f32) -> Result<()> {
        self.audio.endpoint_fault(EndpointStep::SetVolume)?;
        self.update(|e| e.volume = level)
    }

    fn mute(&self) -> Result<bool> {
        self.audio.endpoint_fault(EndpointStep::GetMute)?;
        Ok(self.current()?.muted)
    }

    fn set_mute(&self, muted: bool) -> Result<()> {
        self.audio.endpoint_fault(EndpointStep::SetMute)?;
        self.update(|e| e.muted = muted)
    }
}

// Mixer

struct SimMixerDevice {
    _handle: SimHandle,
    audio: SimAudio,
}

impl SimMixerDevice {
    /// Run `f` on the line owning `control_id`
    fn with_control<T>(
        &self,
        control_id: u32,
        f: impl FnOnce(&mut SimLine) -> MmResult<T>,
    ) -> MmResult<T> {
        let mut state = self.audio.state.lock();
        let line = state
            .lines
            .iter_mut()
            .find(|l| l.volume_control_id() == control_id || l.mute_control_id() == control_id)
            .ok_or(MmError(MIXERR_INVALCONTROL))?;
        f(line)
    }
}

impl MixerSystem for SimAudio {
    fn open(&self) -> MmResult<Box<dyn MixerDevice + '_>> {
        self.mixer_fault(MixerStep::Open)?;
        if self.state.lock().lines.is_empty() {
            return Err(MmError(MMSYSERR_BADDEVICEID));
        }
        Ok(Box::new(SimMixerDevice {
            _handle: self.acquire("mixer"),
            audio: self.clone(),
        }))
    }
}

impl MixerDevice for SimMixerDevice {
    fn line_by_component(&self, component_type: u32) -> MmResult<MixerLine> {
        self.audio.mixer_fault(MixerStep::LineInfo)?;
        let line = self
            .audio
            .line(component_type)
            .ok_or(MmError(MIXERR_INVALLINE))?;
        Ok(MixerLine {
            line_id: line.line_id,
            component_type,
            name: line.name.clone(),
            control_count: u32::from(line.volume.is_some()) + u32::from(line.mute.is_some()),
        })
    }

    fn control_by_type(&self, line: &MixerLine, control_type: u32) -> MmResult<MixerControl> {
        self.audio.mixer_fault(MixerStep::LineControls)?;
        let state = self.audio.state.lock();
        let sim = state
            .lines
            .iter()
            .find(|l| l.line_id == line.line_id)
            .ok_or(MmError(MIXERR_INVALLINE))?;

        match control_type {
            MIXERCONTROL_CONTROLTYPE_VOLUME => {
                let fader = sim.volume.ok_or(MmError(MIXERR_INVALCONTROL))?;
                Ok(MixerControl {
                    control_id: sim.volume_control_id(),
                    control_type,
                    minimum: fader.minimum,
                    maximum: fader.maximum,
                })
            }
            MIXERCONTROL_CONTROLTYPE_MUTE => {
                sim.mute.ok_or(MmError(MIXERR_INVALCONTROL))?;
                Ok(MixerControl {
                    control_id: sim.mute_control_id(),
                    control_type,
                    minimum: 0,
                    maximum: 1,
                })
            }
            _ => Err(MmError(MIXERR_INVALCONTROL)),
        }
    }

    fn unsigned_value(&self, control: &MixerControl) -> MmResult<u32> {
        self.audio.mixer_fault(MixerStep::GetDetails)?;
        self.with_control(control.control_id, |line| {
            line.volume
                .map(|f| f.value)
                .ok_or(MmError(MIXERR_INVALCONTROL))
        })
    }

    fn set_unsigned_value(&self, control: &MixerControl, value: u32) -> MmResult<()> {
        self.audio.mixer_fault(MixerStep::SetDetails)?;
        self.with_control(control.control_id, |line| {
            let fader = line.volume.as_mut().ok_or(MmError(MIXERR_INVALCONTROL))?;
            if value < fader.minimum || value > fader.maximum {
                return Err(MmError(MIXERR_INVALVALUE));
            }
            fader.value = value;
            Ok(())
        })
    }

    fn boolean_value(&self, control: &MixerControl) -> MmResult<bool> {
        self.audio.mixer_fault(MixerStep::GetDetails)?;
        self.with_control(control.control_id, |line| {
            line.mute.ok_or(MmError(MIXERR_INVALCONTROL))
        })
    }

    fn set_boolean_value(&self, control: &MixerControl, value: bool) -> MmResult<()> {
        self.audio.mixer_fault(MixerStep::SetDetails)?;
        self.with_control(control.control_id, |line| {
            let mute = line.mute.as_mut().ok_or(MmError(MIXERR_INVALCONTROL))?;
            *mute = value;
            Ok(())
        })
    }
}

// Waveform register

impl WaveOutSystem for SimAudio {
    fn volume(&self) -> MmResult<u32> {
        self.state
            .lock()
            .wave_register
            .ok_or(MmError(MMSYSERR_NODRIVER))
    }

    fn set_volume(&self, packed: u32) -> MmResult<()> {
        let mut state = self.state.lock();
        match state.wave_register.as_mut() {
            Some(register) => {
                *register = packed;
                Ok(())
            }
            None => Err(MmError(MMSYSERR_NODRIVER)),
        }
    }
}
