//! Pausing a selection half-way through.

use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
pub(super) struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Called by the platform when the held resolution starts.
    pub(super) async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Handle returned by [`SimulatedPlatform::hold`](super::SimulatedPlatform::hold).
///
/// The held device's resolution blocks until [`SelectionGate::release`].
#[derive(Debug, Clone)]
pub struct SelectionGate {
    gate: Arc<Gate>,
}

impl SelectionGate {
    pub(super) fn new(gate: Arc<Gate>) -> Self {
        Self { gate }
    }

    /// Wait until the session is blocked on this gate.
    pub async fn entered(&self) {
        self.gate.entered.notified().await;
    }

    pub fn release(&self) {
        self.gate.release.notify_one();
    }
}
