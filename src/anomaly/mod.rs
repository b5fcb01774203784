//! Policy-driven anomaly flagging over labelled regions.
//!
//! `AnomalyDetector::detect` is pure: the same regions and policy always
//! produce the same markers, in region order. Markers are positioned at
//! region centroids scaled by the volume spacing and are owned by the slice
//! nearest to the centroid.
mod detector;
mod marker;
mod policy;

pub use detector::{AnomalyDetector, AnomalyReport};
pub use marker::{Marker, MarkerSet, MarkerSource};
pub use policy::{AnomalyPolicy, AnomalyTags, ExpectedZone, DEFAULT_MIN_AREA, DEFAULT_TAG};
