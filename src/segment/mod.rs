//! Binarization of volumes and slices.
//!
//! - [`ThresholdSegmenter`]: strict elementwise comparison (`ABOVE`: `v > t`,
//!   `BELOW`: `v < t`).
//! - [`MaskProducer`]: capability trait shared by the threshold segmenter and
//!   externally supplied models ([`ProbabilityMaskModel`]).
//! - [`BinaryMask`]: the 0/1 field consumed by region labeling.

mod mask;
mod producer;
mod threshold;

pub use mask::BinaryMask;
pub use producer::{
    segment_volume_with, MaskProducer, ProbabilityMaskModel, DEFAULT_PROBABILITY_CUTOFF,
};
pub use threshold::{ThresholdDirection, ThresholdOptions, ThresholdSegmenter};
