// ABOUTME: Liveness probes with scripted answers.
// ABOUTME: Lets tests trigger daemon loss at a chosen point.

use async_trait::async_trait;
use dockwrap::probe::LivenessProbe;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Always gives the same answer.
pub struct FixedProbe(pub bool);

#[async_trait]
impl LivenessProbe for FixedProbe {
    async fn is_connected(&self) -> bool {
        self.0
    }
}

/// Connected for the first `n` probes, unreachable afterwards.
pub struct HealthyFor {
    remaining: AtomicUsize,
}

impl HealthyFor {
    pub fn new(n: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(n),
        }
    }
}

#[async_trait]
impl LivenessProbe for HealthyFor {
    async fn is_connected(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}
