//! Windows implementations of the audio subsystem seam
//!
//! - `endpoint`: MMDevice enumerator + `IAudioEndpointVolume`
//! - `mixer`: `mixer*` line/control API
//! - `waveout`: `waveOutGetVolume` / `waveOutSetVolume`

mod endpoint;
mod mixer;
mod waveout;

pub use endpoint::CoreAudioEndpoints;
pub use mixer::WinMixer;
pub use waveout::WinWaveOut;
