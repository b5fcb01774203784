//! Connected-component labelling and per-region shape statistics.
//!
//! Labels are positive and assigned in seed scan order (z, then y, then x);
//! background elements keep label 0. Each `Region` carries its area,
//! centroid and inclusive bounding box in the mask's own index space,
//! plus principal-axis spreads from the member covariance.
mod accumulator;
mod labeler;
mod types;

pub use labeler::RegionLabeler;
pub use types::{BoundingBox, Connectivity, LabelMap, Labeling, Region};
