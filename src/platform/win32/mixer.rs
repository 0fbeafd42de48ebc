//! Legacy mixer lines and controls through the `mixer*` API

use std::ffi::c_void;
use std::mem::size_of;

use windows::Win32::Media::Audio::{
    mixerClose, mixerGetControlDetailsW, mixerGetLineControlsW, mixerGetLineInfoW, mixerOpen,
    mixerSetControlDetails, HMIXER, HMIXEROBJ, MIXERCONTROLDETAILS, MIXERCONTROLDETAILS_BOOLEAN,
    MIXERCONTROLDETAILS_UNSIGNED, MIXERCONTROLW, MIXERLINECONTROLSW, MIXERLINECONTROLSW_0,
    MIXERLINEW, MIXERLINE_COMPONENTTYPE,
};

use crate::constants::*;
use crate::platform::{MixerControl, MixerDevice, MixerLine, MixerSystem, MmError, MmResult};

/// Mixer opened by device identifier
#[derive(Debug, Clone, Copy)]
pub struct WinMixer {
    pub device_id: u32,
}

impl Default for WinMixer {
    fn default() -> Self {
        Self {
            device_id: DEFAULT_MIXER_ID,
        }
    }
}

fn check(code: u32) -> MmResult<()> {
    if code == MMSYSERR_NOERROR {
        Ok(())
    } else {
        Err(MmError(code))
    }
}

fn wide_to_string(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

impl MixerSystem for WinMixer {
    fn open(&self) -> MmResult<Box<dyn MixerDevice + '_>> {
        let mut handle = HMIXER::default();
        check(unsafe {
            mixerOpen(
                Some(&mut handle as *mut HMIXER),
                self.device_id,
                0,
                0,
                MIXER_OBJECTF_MIXER,
            )
        })?;
        tracing::debug!("Mixer {} opened", self.device_id);
        Ok(Box::new(MixerHandle(handle)))
    }
}

/// Open mixer handle, closed on drop
struct MixerHandle(HMIXER);

impl MixerHandle {
    fn object(&self) -> HMIXEROBJ {
        HMIXEROBJ(self.0 .0)
    }

    fn details<T>(&self, control: &MixerControl, value: &mut T) -> MIXERCONTROLDETAILS {
        MIXERCONTROLDETAILS {
            cbStruct: size_of::<MIXERCONTROLDETAILS>() as u32,
            dwControlID: control.control_id,
            // Uniform: one value for all channels
            cChannels: 1,
            cbDetails: size_of::<T>() as u32,
            paDetails: value as *mut T as *mut c_void,
            ..Default::default()
        }
    }

    fn read<T>(&self, control: &MixerControl, value: &mut T) -> MmResult<()> {
        let mut details = self.details(control, value);
        check(unsafe {
            mixerGetControlDetailsW(
                self.object(),
                &mut details,
                MIXER_OBJECTF_HMIXER | MIXER_GETCONTROLDETAILSF_VALUE,
            )
        })
    }

    fn write<T>(&self, control: &MixerControl, value: &mut T) -> MmResult<()> {
        let details = self.details(control, value);
        check(unsafe {
            mixerSetControlDetails(
                self.object(),
                &details,
                MIXER_OBJECTF_HMIXER | MIXER_SETCONTROLDETAILSF_VALUE,
            )
        })
    }
}

impl MixerDevice for MixerHandle {
    fn line_by_component(&self, component_type: u32) -> MmResult<MixerLine> {
        let mut line = MIXERLINEW {
            cbStruct: size_of::<MIXERLINEW>() as u32,
            dwComponentType: MIXERLINE_COMPONENTTYPE(component_type),
            ..Default::default()
        };
        check(unsafe {
            mixerGetLineInfoW(
                self.object(),
                &mut line,
                MIXER_OBJECTF_HMIXER | MIXER_GETLINEINFOF_COMPONENTTYPE,
            )
        })?;

        // Packed struct, copy out before borrowing
        let name = line.szName;
        Ok(MixerLine {
            line_id: line.dwLineID,
            component_type,
            name: wide_to_string(&name),
            control_count: line.cControls,
        })
    }

    fn control_by_type(&self, line: &MixerLine, control_type: u32) -> MmResult<MixerControl> {
        let mut control = MIXERCONTROLW {
            cbStruct: size_of::<MIXERCONTROLW>() as u32,
            ..Default::default()
        };
        let mut query = MIXERLINECONTROLSW {
            cbStruct: size_of::<MIXERLINECONTROLSW>() as u32,
            dwLineID: line.line_id,
            Anonymous: MIXERLINECONTROLSW_0 {
                dwControlType: control_type,
            },
            cControls: 1,
            cbmxctrl: size_of::<MIXERCONTROLW>() as u32,
            pamxctrl: &mut control,
        };
        check(unsafe {
            mixerGetLineControlsW(
                self.object(),
                &mut query,
                MIXER_OBJECTF_HMIXER | MIXER_GETLINECONTROLSF_ONEBYTYPE,
            )
        })?;

        // Unsigned view of the bounds union
        let (minimum, maximum) = unsafe {
            (
                control.Bounds.Anonymous2.dwMinimum,
                control.Bounds.Anonymous2.dwMaximum,
            )
        };
        Ok(MixerControl {
            control_id: control.dwControlID,
            control_type: control.dwControlType,
            minimum,
            maximum,
        })
    }

    fn unsigned_value(&self, control: &MixerControl) -> MmResult<u32> {
        let mut value = MIXERCONTROLDETAILS_UNSIGNED::default();
        self.read(control, &mut value)?;
        Ok(value.dwValue)
    }

    fn set_unsigned_value(&self, control: &MixerControl, value: u32) -> MmResult<()> {
        let mut value = MIXERCONTROLDETAILS_UNSIGNED { dwValue: value };
        self.write(control, &mut value)
    }

    fn boolean_value(&self, control: &MixerControl) -> MmResult<bool> {
        let mut value = MIXERCONTROLDETAILS_BOOLEAN::default();
        self.read(control, &mut value)?;
        Ok(value.fValue != 0)
    }

    fn set_boolean_value(&self, control: &MixerControl, value: bool) -> MmResult<()> {
        let mut value = MIXERCONTROLDETAILS_BOOLEAN {
            fValue: i32::from(value),
        };
        self.write(control, &mut value)
    }
}

impl Drop for MixerHandle {
    fn drop(&mut self) {
        let code = unsafe { mixerClose(self.0) };
        if code != MMSYSERR_NOERROR {
            tracing::warn!("mixerClose failed: {}", MmError(code));
        } else {
            tracing::debug!("Mixer closed");
        }
    }
}
