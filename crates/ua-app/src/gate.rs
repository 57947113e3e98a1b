use tokio::sync::{Mutex, MutexGuard};

/// Single ordered execution lane for account backend mutations.
///
/// Every operation that touches the backend handle or steps the state
/// machine runs while holding a permit. Tokio's mutex queues waiters in
/// arrival order, so events observe gate-arrival ordering and the handle is
/// never used concurrently.
#[derive(Default)]
pub struct OpGate {
    lane: Mutex<()>,
}

impl OpGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> OpPermit<'_> {
        OpPermit {
            _guard: self.lane.lock().await,
        }
    }
}

/// Proof that the holder is the only task on the gate.
pub struct OpPermit<'a> {
    _guard: MutexGuard<'a, ()>,
}
