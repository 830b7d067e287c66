//! Rendezvous used by mocks to park a call until a test releases it

use tokio::sync::Notify;

#[derive(Debug, Default)]
pub struct Gate {
    reached: Notify,
    release: Notify,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the parked side: signal arrival, then wait for release
    pub async fn pass(&self) {
        self.reached.notify_one();
        self.release.notified().await;
    }

    /// Wait until a call is parked at the gate
    pub async fn reached(&self) {
        self.reached.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}
