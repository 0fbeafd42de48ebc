//! Default endpoint volume through the MMDevice API

use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::{
    eCapture, eConsole, eRender, IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED,
};

use crate::backend::BackendKind;
use crate::constants::E_NOTFOUND;
use crate::error::{Error, Result};
use crate::platform::{EndpointSystem, EndpointVolume};
use crate::protocol::DataFlow;

/// Endpoint source backed by the system device enumerator
pub struct CoreAudioEndpoints;

/// COM apartment for the duration of one session
struct ComApartment {
    initialized: bool,
}

impl ComApartment {
    fn enter() -> Self {
        // S_FALSE (already initialized) still needs a matching uninitialize;
        // RPC_E_CHANGED_MODE does not.
        let initialized = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }.is_ok();
        Self { initialized }
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.initialized {
            unsafe { CoUninitialize() };
        }
    }
}

/// Acquired endpoint session.
///
/// Fields drop in declaration order: device, volume interface, enumerator,
/// then the apartment.
struct EndpointSession {
    _device: IMMDevice,
    volume: IAudioEndpointVolume,
    _enumerator: IMMDeviceEnumerator,
    _apartment: ComApartment,
}

fn failure(err: windows::core::Error) -> Error {
    Error::BackendFailure {
        backend: BackendKind::Endpoint,
        code: err.code().0 as u32,
    }
}

impl EndpointSystem for CoreAudioEndpoints {
    fn open(&self, flow: DataFlow) -> Result<Box<dyn EndpointVolume + '_>> {
        let apartment = ComApartment::enter();

        let enumerator: IMMDeviceEnumerator =
            unsafe { CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL) }.map_err(failure)?;
        tracing::debug!("Device enumerator acquired");

        let data_flow = match flow {
            DataFlow::Render => eRender,
            DataFlow::Capture => eCapture,
        };
        let device = unsafe { enumerator.GetDefaultAudioEndpoint(data_flow, eConsole) }
            .map_err(|e| {
                let code = e.code().0 as u32;
                if code == E_NOTFOUND {
                    Error::DeviceUnavailable {
                        target: format!("{} endpoint", flow),
                        code: Some(code),
                    }
                } else {
                    failure(e)
                }
            })?;
        tracing::debug!("Default {} endpoint resolved", flow);

        let volume: IAudioEndpointVolume =
            unsafe { device.Activate(CLSCTX_ALL, None) }.map_err(failure)?;
        tracing::debug!("Endpoint volume interface activated");

        Ok(Box::new(EndpointSession {
            _device: device,
            volume,
            _enumerator: enumerator,
            _apartment: apartment,
        }))
    }
}

impl EndpointVolume for EndpointSession {
    fn volume(&self) -> Result<f32> {
        unsafe { self.volume.GetMasterVolumeLevelScalar() }.map_err(failure)
    }

    fn set_volume(&self, level: f32) -> Result<()> {
        unsafe {
            self.volume
                .SetMasterVolumeLevelScalar(level, std::ptr::null())
                .map_err(failure)
        }
    }

    fn mute(&self) -> Result<bool> {
        let muted = unsafe { self.volume.GetMute() }.map_err(failure)?;
        Ok(muted.as_bool())
    }

    fn set_mute(&self, muted: bool) -> Result<()> {
        unsafe { self.volume.SetMute(muted, std::ptr::null()).map_err(failure) }
    }
}

impl Drop for EndpointSession {
    fn drop(&mut self) {
        tracing::debug!("Releasing endpoint session");
    }
}
