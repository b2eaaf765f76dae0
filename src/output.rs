// Shared latest output: the single most recent payload, replaced whole each tick

use std::sync::Arc;
use tokio::sync::watch;

use crate::models::Payload;

/// Publisher side. Owned by the sampler; each publish swaps in a new
/// `Arc<Payload>` so readers only ever see a complete payload.
pub struct SharedOutput {
    tx: watch::Sender<Arc<Payload>>,
}

/// Read-only handle held by server connections.
#[derive(Clone)]
pub struct LatestOutput {
    rx: watch::Receiver<Arc<Payload>>,
}

impl SharedOutput {
    pub fn new() -> (Self, LatestOutput) {
        let (tx, rx) = watch::channel(Arc::new(Payload::empty()));
        (Self { tx }, LatestOutput { rx })
    }

    /// Replace the current payload. Succeeds with no readers attached.
    pub fn publish(&self, payload: Payload) -> Arc<Payload> {
        let payload = Arc::new(payload);
        self.tx.send_replace(payload.clone());
        payload
    }
}

impl LatestOutput {
    pub fn latest(&self) -> Arc<Payload> {
        self.rx.borrow().clone()
    }
}
