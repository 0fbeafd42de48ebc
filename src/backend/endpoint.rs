//! Default endpoint backend
//!
//! The endpoint interface works in normalized units already, so volumes
//! pass through unscaled in both directions.

use crate::backend::{BackendKind, VolumeBackend};
use crate::error::Result;
use crate::platform::EndpointSystem;
use crate::protocol::{DataFlow, Request, VolumeReport};

/// Volume/mute of the default console endpoint for one direction
pub struct EndpointBackend<'a> {
    system: &'a dyn EndpointSystem,
    flow: DataFlow,
}

impl<'a> EndpointBackend<'a> {
    pub fn new(system: &'a dyn EndpointSystem, flow: DataFlow) -> Self {
        Self { system, flow }
    }

    pub fn flow(&self) -> DataFlow {
        self.flow
    }
}

impl VolumeBackend for EndpointBackend<'_> {
    fn kind(&self) -> BackendKind {
        BackendKind::Endpoint
    }

    fn execute(&self, request: &Request) -> Result<VolumeReport> {
        let ops = request.operations;
        let endpoint = self.system.open(self.flow)?;
        let mut report = VolumeReport::default();

        if ops.sets_volume() {
            tracing::debug!("Setting {} endpoint volume to {:.3}", self.flow, request.volume);
            endpoint.set_volume(request.volume)?;
        }
        if ops.sets_mute() {
            tracing::debug!("Setting {} endpoint mute to {}", self.flow, request.mute_target);
            endpoint.set_mute(request.mute_target)?;
        }
        if ops.gets_volume() {
            report.volume = Some(endpoint.volume()?);
        }
        if ops.gets_mute() {
            report.muted = Some(endpoint.mute()?);
        }

        Ok(report)
    }
}
