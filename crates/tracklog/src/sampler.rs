//! Timer-driven location sampler.
//!
//! The sampler requests one location fix per tick and forwards the
//! result to the store and the map sink. The state machine is
//! `Idle → AwaitingFix → Idle`: a tick only issues a request from
//! `Idle`, the request is awaited inline, and a tick that arrives
//! while a request is outstanding is skipped. At most one fix request
//! is ever in flight, and all store writes happen from this single
//! task, so no two writes can interleave.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::sample::LocationSample;
use crate::sink::MapSink;
use crate::source::{Authorization, LocationSource};
use crate::storage::Store;

/// Sampler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// No fix request in flight.
    Idle,
    /// A fix request has been issued and not yet answered.
    AwaitingFix,
}

/// Fixed-cadence location sampler.
#[derive(Debug)]
pub struct Sampler<S, M> {
    source: S,
    store: Store,
    sink: M,
    interval: Duration,
    state: SamplerState,
    centered: bool,
    fix_requests: u64,
    samples_recorded: u64,
}

impl<S, M> Sampler<S, M>
where
    S: LocationSource,
    M: MapSink,
{
    /// Create a sampler over the given source, store, and sink.
    #[must_use]
    pub fn new(source: S, store: Store, sink: M, interval: Duration) -> Self {
        Self {
            source,
            store,
            sink,
            interval,
            state: SamplerState::Idle,
            centered: false,
            fix_requests: 0,
            samples_recorded: 0,
        }
    }

    /// Current state of the fix-request state machine.
    #[must_use]
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Number of fix requests issued since construction.
    #[must_use]
    pub fn fix_requests(&self) -> u64 {
        self.fix_requests
    }

    /// Number of samples successfully recorded since construction.
    #[must_use]
    pub fn samples_recorded(&self) -> u64 {
        self.samples_recorded
    }

    /// Whether the map has been centered on a first fix yet.
    #[must_use]
    pub fn has_centered(&self) -> bool {
        self.centered
    }

    /// Check preconditions and request authorization if undetermined.
    ///
    /// Returns `true` if the sampler may start ticking. With services
    /// disabled or authorization denied the sampler never arms; it
    /// issues zero fix requests and stays in `Idle`.
    pub async fn arm(&mut self) -> bool {
        if !self.source.services_enabled() {
            info!("location services disabled; sampler will not arm");
            return false;
        }

        let auth = match self.source.authorization() {
            Authorization::NotDetermined => match self.source.request_authorization().await {
                Ok(auth) => auth,
                Err(e) => {
                    warn!("authorization request failed: {e}");
                    return false;
                }
            },
            other => other,
        };

        match auth {
            Authorization::Granted => true,
            Authorization::Denied => {
                info!("location authorization denied; sampler will not arm");
                false
            }
            Authorization::NotDetermined => {
                warn!("location authorization still undetermined; sampler will not arm");
                false
            }
        }
    }

    /// Perform one sampling cycle: request a fix, record and render it.
    ///
    /// Failures are logged and abandoned; the next tick starts fresh.
    pub async fn tick_once(&mut self) {
        if self.state != SamplerState::Idle {
            debug!("fix request still outstanding, skipping tick");
            return;
        }

        self.state = SamplerState::AwaitingFix;
        self.fix_requests += 1;
        let outcome = self.source.request_fix().await;
        // Back to Idle regardless of outcome; no retry before the next tick
        self.state = SamplerState::Idle;

        let fixes = match outcome {
            Ok(fixes) => fixes,
            Err(e) => {
                warn!("fix failed: {e}");
                return;
            }
        };

        // Delivery may batch several positions; use the first
        let Some(fix) = fixes.first().copied() else {
            debug!("empty fix delivery");
            return;
        };

        if !fix.is_valid() {
            warn!(
                latitude = fix.latitude,
                longitude = fix.longitude,
                "discarding fix with invalid coordinates"
            );
            return;
        }

        let sample = LocationSample::from_fix(fix);
        match self.store.append(&sample) {
            Ok(id) => {
                debug!(id, "recorded sample");
                self.samples_recorded += 1;
                self.sink.render(&sample);
                if !self.centered {
                    self.sink.center(sample.latitude, sample.longitude);
                    self.centered = true;
                }
            }
            Err(e) => warn!("store write failed: {e}"),
        }
    }

    /// Run the sampler until the shutdown signal flips to `true`.
    ///
    /// The first tick fires immediately upon arming, then every
    /// interval thereafter. If the sampler cannot arm this returns
    /// right away.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        if !self.arm().await {
            return;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = self.interval.as_secs(), "sampler armed");

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick_once().await,
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(
            samples = self.samples_recorded,
            requests = self.fix_requests,
            "sampler stopped"
        );
    }
}
