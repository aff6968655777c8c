//! Simulated barcode scanners.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use tapscan_core::{
    application::{ApplicationError, BarcodeScanner, ClaimedScanner, PortResult, ScannerProvider},
    domain::DeviceId,
};

use super::{Activity, DeviceSpec, SimulatedPlatform};

#[async_trait]
impl ScannerProvider for SimulatedPlatform {
    async fn from_id(&self, id: &DeviceId) -> Option<Box<dyn BarcodeScanner>> {
        if let Some(gate) = self.take_gate(id) {
            gate.pass().await;
        }

        match self.spec(id) {
            Some(spec) => {
                self.record(Activity::Resolved { device: id.clone() });
                Some(Box::new(SimulatedScanner {
                    platform: self.clone(),
                    spec,
                }))
            }
            None => {
                self.record(Activity::ResolveFailed { device: id.clone() });
                None
            }
        }
    }
}

/// An unclaimed simulated scanner.
#[derive(Debug)]
pub struct SimulatedScanner {
    platform: SimulatedPlatform,
    spec: DeviceSpec,
}

#[async_trait]
impl BarcodeScanner for SimulatedScanner {
    fn device_id(&self) -> DeviceId {
        self.spec.id().clone()
    }

    fn video_device_id(&self) -> Option<String> {
        self.spec.video_device.clone()
    }

    async fn claim(&self) -> Option<Box<dyn ClaimedScanner>> {
        let device = self.spec.id().clone();
        let claimable = self.spec.claimable;
        let granted = self
            .platform
            .with(|inner| {
                if !claimable || inner.claimed.contains(&device) {
                    return false;
                }
                inner.claimed.push(device.clone());
                inner.max_concurrent_claims = inner.max_concurrent_claims.max(inner.claimed.len());
                true
            })
            .unwrap_or(false);

        if !granted {
            self.platform.record(Activity::ClaimRefused { device });
            return None;
        }
        self.platform.record(Activity::Claimed {
            device: device.clone(),
        });
        Some(Box::new(SimulatedClaim {
            platform: self.platform.clone(),
            device,
            enabled: AtomicBool::new(false),
            released: AtomicBool::new(false),
        }))
    }
}

/// A claim on a simulated scanner.
#[derive(Debug)]
pub struct SimulatedClaim {
    platform: SimulatedPlatform,
    device: DeviceId,
    enabled: AtomicBool,
    released: AtomicBool,
}

impl SimulatedClaim {
    fn ensure_held(&self, operation: &'static str) -> PortResult<()> {
        if self.released.load(Ordering::SeqCst) {
            return Err(ApplicationError::port(operation, "claim already released"));
        }
        Ok(())
    }
}

#[async_trait]
impl ClaimedScanner for SimulatedClaim {
    async fn enable(&self) -> PortResult<()> {
        self.ensure_held("enable")?;
        self.enabled.store(true, Ordering::SeqCst);
        self.platform.record(Activity::Enabled {
            device: self.device.clone(),
        });
        Ok(())
    }

    async fn start_software_trigger(&self) -> PortResult<()> {
        self.ensure_held("start software trigger")?;
        if !self.enabled.load(Ordering::SeqCst) {
            return Err(ApplicationError::port(
                "start software trigger",
                "scanner is not enabled",
            ));
        }
        self.platform.record(Activity::TriggerStarted {
            device: self.device.clone(),
        });
        Ok(())
    }

    async fn stop_software_trigger(&self) -> PortResult<()> {
        self.ensure_held("stop software trigger")?;
        self.platform.record(Activity::TriggerStopped {
            device: self.device.clone(),
        });
        Ok(())
    }

    async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        let device = self.device.clone();
        self.platform
            .with(|inner| inner.claimed.retain(|d| *d != device));
        self.platform.record(Activity::Released {
            device: self.device.clone(),
        });
    }
}
