//! Simulated location service and terminal map surface.
//!
//! Stand-ins for the host platform's location subsystem and map
//! widget, so the recorder can run anywhere. The source drifts
//! deterministically from a start coordinate; the map prints
//! annotations to the log and keeps the current annotation set in
//! memory.

use tracing::info;

use crate::sample::{Fix, LocationSample};
use crate::sink::{Annotation, MapSink, CENTER_SPAN_DEG};
use crate::source::{Authorization, LocationSource, Result};

/// Per-fix drift in degrees.
const DRIFT_DEG: f64 = 0.0001;

/// A deterministic drifting location source.
///
/// Each delivered fix moves a small step along a slowly turning
/// heading, so recorded tracks look like a walk rather than a point.
#[derive(Debug)]
pub struct SimulatedSource {
    latitude: f64,
    longitude: f64,
    auth: Authorization,
    fixes_delivered: u64,
}

impl SimulatedSource {
    /// Create a source starting at the given coordinate.
    #[must_use]
    pub fn new(start_latitude: f64, start_longitude: f64) -> Self {
        Self {
            latitude: start_latitude,
            longitude: start_longitude,
            auth: Authorization::NotDetermined,
            fixes_delivered: 0,
        }
    }

    /// Number of fixes delivered so far.
    #[must_use]
    pub fn fixes_delivered(&self) -> u64 {
        self.fixes_delivered
    }
}

#[async_trait::async_trait]
impl LocationSource for SimulatedSource {
    fn services_enabled(&self) -> bool {
        true
    }

    fn authorization(&self) -> Authorization {
        self.auth
    }

    async fn request_authorization(&mut self) -> Result<Authorization> {
        // The simulated user always consents
        self.auth = Authorization::Granted;
        Ok(self.auth)
    }

    async fn request_fix(&mut self) -> Result<Vec<Fix>> {
        // Turn slowly so the drift traces an arc instead of a line
        #[allow(clippy::cast_precision_loss)]
        let heading = (self.fixes_delivered as f64) * 0.1;
        self.latitude = (self.latitude + DRIFT_DEG * heading.cos()).clamp(-90.0, 90.0);
        self.longitude = (self.longitude + DRIFT_DEG * heading.sin()).clamp(-180.0, 180.0);
        self.fixes_delivered += 1;

        Ok(vec![Fix::new(self.latitude, self.longitude)])
    }
}

/// A map surface that renders annotations to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleMap {
    annotations: Vec<Annotation>,
    center: Option<(f64, f64)>,
}

impl ConsoleMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current annotation set.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The coordinate the view is centered on, if any.
    #[must_use]
    pub fn center_coordinate(&self) -> Option<(f64, f64)> {
        self.center
    }
}

impl MapSink for ConsoleMap {
    fn render(&mut self, sample: &LocationSample) {
        let annotation = Annotation::for_sample(sample);
        info!(
            latitude = annotation.latitude,
            longitude = annotation.longitude,
            "pin: {}",
            annotation.label
        );
        self.annotations.push(annotation);
    }

    fn center(&mut self, latitude: f64, longitude: f64) {
        info!(
            latitude,
            longitude,
            span_deg = CENTER_SPAN_DEG,
            "centering map"
        );
        self.center = Some((latitude, longitude));
    }

    fn clear(&mut self) {
        info!(removed = self.annotations.len(), "clearing annotations");
        self.annotations.clear();
    }
}
