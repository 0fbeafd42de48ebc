//! Master volume and mute control for desktop audio devices
//!
//! One request contract ({set,get} × {volume,mute}) served by three OS
//! backends:
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌────────────────────────────────────────┐
//! │ Request  │──>│ resolver │──>│ Modern: endpoint volume (render/capture)│
//! └──────────┘   └──────────┘   │ Legacy: mixer line controls            │
//!                               │   + optional waveform register channel │
//!                               └────────────────────────────────────────┘
//! ```
//!
//! Volumes are normalized fractions in `[0.0, 1.0]` at every public boundary.
//! Raw device units (mixer integers, packed waveform registers) stay inside
//! the backends.

pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod platform;
pub mod protocol;
pub mod resolver;
pub mod service;
pub mod tier;

pub use error::{Error, Result};
pub use protocol::{DataFlow, LineSelector, Operations, Request, VolumeReport};
pub use resolver::{resolve, ResolvedBackend};
pub use service::VolumeService;
pub use tier::{CapabilityTier, TierPreference};
