//! Face detection: snapshots, models and the throttled tracker.

pub mod detection;
pub mod model;
pub mod tracker;
