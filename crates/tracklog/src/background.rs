//! Background continuation for the sampler.
//!
//! When the host loses foreground execution its timers stop firing.
//! [`BackgroundRunner`] keeps the sampler alive for a bounded grace
//! period by holding an execution [`Lease`]: a scoped, best-effort
//! grant with a host-imposed maximum duration. The lease is acquired
//! before continued sampling and released on scope exit or expiry, in
//! strict pairs; it is never renewed.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A scoped execution grant with a fixed maximum duration.
///
/// Dropping the lease releases the grant, so acquire and release
/// always pair up.
#[derive(Debug)]
pub struct Lease {
    deadline: Instant,
}

impl Lease {
    /// Acquire a lease valid for at most `max`.
    #[must_use]
    pub fn acquire(max: Duration) -> Self {
        debug!(max_secs = max.as_secs(), "execution lease acquired");
        Self {
            deadline: Instant::now() + max,
        }
    }

    /// Time remaining before the lease expires.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Check whether the lease has expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        debug!("execution lease released");
    }
}

/// Supervises a sampler task across the host's background transition.
#[derive(Debug)]
pub struct BackgroundRunner {
    grace: Duration,
}

impl BackgroundRunner {
    /// Create a runner with the given grace period.
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// Supervise a running sampler task.
    ///
    /// `background` flips to `true` when the host loses foreground
    /// execution. At that point the runner acquires a lease and lets
    /// the sampler keep ticking until the lease expires or the host
    /// signals again (termination), then releases the lease and stops
    /// the sampler. Returns once the sampler task has finished.
    pub async fn supervise(
        &self,
        mut task: JoinHandle<()>,
        stop: watch::Sender<bool>,
        mut background: watch::Receiver<bool>,
    ) {
        // Foreground phase: run until backgrounded or the sampler
        // finishes on its own (e.g. it never armed).
        tokio::select! {
            res = &mut task => {
                log_join(res);
                return;
            }
            res = background.changed() => {
                if res.is_err() {
                    stop_and_join(&stop, task).await;
                    return;
                }
            }
        }

        // Background phase: bounded by the lease.
        let lease = Lease::acquire(self.grace);
        info!(
            grace_secs = self.grace.as_secs(),
            "entered background, sampling under execution lease"
        );

        tokio::select! {
            res = &mut task => {
                log_join(res);
                return;
            }
            () = tokio::time::sleep(lease.remaining()) => {
                info!("execution lease expired");
            }
            _ = background.changed() => {
                info!("host terminating");
            }
        }

        drop(lease);
        stop_and_join(&stop, task).await;
    }
}

/// Signal the sampler to stop and wait for it.
async fn stop_and_join(stop: &watch::Sender<bool>, task: JoinHandle<()>) {
    let _ = stop.send(true);
    log_join(task.await);
}

fn log_join(res: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        warn!("sampler task failed: {e}");
    }
}
