//! Map rendering abstraction.
//!
//! The map surface is an external collaborator: it consumes
//! (coordinate, label) pairs and renders them as annotations. The
//! annotation set is a read-only projection of the store, rebuilt at
//! startup and appended incrementally afterwards; it is never
//! persisted.

use crate::error::Result;
use crate::sample::LocationSample;
use crate::storage::Store;

/// Span, in degrees, of the region shown when centering on a sample.
pub const CENTER_SPAN_DEG: f64 = 0.001;

/// A map marker representing one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Latitude of the marker.
    pub latitude: f64,
    /// Longitude of the marker.
    pub longitude: f64,
    /// Human-readable timestamp label.
    pub label: String,
}

impl Annotation {
    /// Build the annotation for a sample.
    #[must_use]
    pub fn for_sample(sample: &LocationSample) -> Self {
        Self {
            latitude: sample.latitude,
            longitude: sample.longitude,
            label: sample.label(),
        }
    }
}

/// A consumer of location samples that renders them on a map surface.
pub trait MapSink: Send {
    /// Add one annotation for the given sample.
    fn render(&mut self, sample: &LocationSample);

    /// Recenter the view to a tight span around the coordinate.
    ///
    /// The sampler calls this exactly once, on the first successful fix.
    fn center(&mut self, latitude: f64, longitude: f64);

    /// Remove all annotations.
    fn clear(&mut self);
}

/// Rebuild the sink's annotation set from the store.
///
/// Called at startup so previously recorded samples reappear on the
/// map. Does not recenter; centering is reserved for the first live
/// fix.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn rebuild_annotations(store: &Store, sink: &mut dyn MapSink) -> Result<usize> {
    let samples = store.fetch_all()?;
    for sample in &samples {
        sink.render(sample);
    }
    Ok(samples.len())
}

/// Clear recorded history and the map projection in lockstep.
///
/// Returns the number of samples deleted. The sink is cleared only
/// after the store delete succeeds, so the projection never runs
/// ahead of the store.
///
/// # Errors
///
/// Returns an error if the store delete fails; the sink is left
/// untouched in that case.
pub fn clear_history(store: &Store, sink: &mut dyn MapSink) -> Result<usize> {
    let deleted = store.clear_all()?;
    sink.clear();
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Sink that records every call for assertions.
    #[derive(Debug, Default)]
    struct RecordingSink {
        annotations: Vec<Annotation>,
        centers: Vec<(f64, f64)>,
        clears: usize,
    }

    impl MapSink for RecordingSink {
        fn render(&mut self, sample: &LocationSample) {
            self.annotations.push(Annotation::for_sample(sample));
        }

        fn center(&mut self, latitude: f64, longitude: f64) {
            self.centers.push((latitude, longitude));
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.annotations.clear();
        }
    }

    #[test]
    fn test_annotation_for_sample() {
        let mut sample = LocationSample::new(40.0, 29.0);
        sample.timestamp = Utc.with_ymd_and_hms(2018, 1, 4, 15, 4, 5).unwrap();

        let annotation = Annotation::for_sample(&sample);
        assert_eq!(annotation.latitude, 40.0);
        assert_eq!(annotation.longitude, 29.0);
        assert_eq!(annotation.label, "Jan 4, 3:04:05 PM");
    }

    #[test]
    fn test_center_span_constant() {
        assert!((CENTER_SPAN_DEG - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rebuild_annotations_empty_store() {
        let store = Store::open_in_memory().unwrap();
        let mut sink = RecordingSink::default();

        let count = rebuild_annotations(&store, &mut sink).unwrap();
        assert_eq!(count, 0);
        assert!(sink.annotations.is_empty());
    }

    #[test]
    fn test_rebuild_annotations_renders_all_in_order() {
        let store = Store::open_in_memory().unwrap();
        store.append(&LocationSample::new(40.0, 29.0)).unwrap();
        store
            .append(&LocationSample::new(40.0001, 29.0001))
            .unwrap();

        let mut sink = RecordingSink::default();
        let count = rebuild_annotations(&store, &mut sink).unwrap();

        assert_eq!(count, 2);
        assert_eq!(sink.annotations.len(), 2);
        assert!((sink.annotations[0].latitude - 40.0).abs() < f64::EPSILON);
        assert!((sink.annotations[1].latitude - 40.0001).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rebuild_does_not_center() {
        let store = Store::open_in_memory().unwrap();
        store.append(&LocationSample::new(40.0, 29.0)).unwrap();

        let mut sink = RecordingSink::default();
        rebuild_annotations(&store, &mut sink).unwrap();

        assert!(sink.centers.is_empty());
    }

    #[test]
    fn test_clear_history_clears_both() {
        let store = Store::open_in_memory().unwrap();
        store.append(&LocationSample::new(40.0, 29.0)).unwrap();
        store.append(&LocationSample::new(41.0, 30.0)).unwrap();

        let mut sink = RecordingSink::default();
        rebuild_annotations(&store, &mut sink).unwrap();
        assert_eq!(sink.annotations.len(), 2);

        let deleted = clear_history(&store, &mut sink).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(sink.clears, 1);
        assert!(sink.annotations.is_empty());
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_clear_history_empty() {
        let store = Store::open_in_memory().unwrap();
        let mut sink = RecordingSink::default();

        let deleted = clear_history(&store, &mut sink).unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(sink.clears, 1);
    }
}
