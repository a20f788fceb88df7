//! `tracklog` - A minimal location-history recorder
//!
//! This library samples device location on a fixed cadence, persists each
//! sample to a durable append-only store, and projects the recorded track
//! onto a map surface as timestamp-labeled annotations.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod background;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod sample;
pub mod sampler;
pub mod sim;
pub mod sink;
pub mod source;
pub mod storage;

pub use background::{BackgroundRunner, Lease};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use sample::{Fix, LocationSample};
pub use sampler::{Sampler, SamplerState};
pub use sink::{Annotation, MapSink};
pub use source::{Authorization, LocationSource};
pub use storage::{Store, StoreStats};
