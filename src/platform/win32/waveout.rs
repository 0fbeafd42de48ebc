//! Global waveform output volume register

use windows::Win32::Media::Audio::{waveOutGetVolume, waveOutSetVolume, HWAVEOUT};

use crate::constants::MMSYSERR_NOERROR;
use crate::platform::{MmError, MmResult, WaveOutSystem};

/// Waveform output device 0, addressed through a null handle
pub struct WinWaveOut;

impl WaveOutSystem for WinWaveOut {
    fn volume(&self) -> MmResult<u32> {
        let mut packed = 0u32;
        match unsafe { waveOutGetVolume(HWAVEOUT::default(), &mut packed) } {
            MMSYSERR_NOERROR => Ok(packed),
            code => Err(MmError(code)),
        }
    }

    fn set_volume(&self, packed: u32) -> MmResult<()> {
        match unsafe { waveOutSetVolume(HWAVEOUT::default(), packed) } {
            MMSYSERR_NOERROR => Ok(()),
            code => Err(MmError(code)),
        }
    }
}
