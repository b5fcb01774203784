//! Capability interface for anything that turns a slice into a binary mask.
//!
//! Threshold segmentation and learned models are interchangeable inputs to
//! region labeling: both implement [`MaskProducer`]. A learned model is
//! consumed as a black box through [`ProbabilityMaskModel`], which wraps any
//! closure returning a per-pixel probability map.
use super::mask::BinaryMask;
use crate::error::{checked_element_count, VolumeError};
use crate::image::ImageU16;
use crate::volume::Volume;
use log::debug;

pub trait MaskProducer {
    /// Produce a depth-1 mask with the slice's rows and columns.
    fn produce_mask(&self, slice: &ImageU16<'_>) -> Result<BinaryMask, VolumeError>;
}

/// Default probability cutoff used for sigmoid model outputs.
pub const DEFAULT_PROBABILITY_CUTOFF: f32 = 0.5;

/// Adapter binarizing a probability map with `p > cutoff`.
///
/// The closure receives the slice and must return `w * h` probabilities in
/// row-major order. NaN probabilities are treated as unset.
pub struct ProbabilityMaskModel<F> {
    infer: F,
    cutoff: f32,
}

impl<F> ProbabilityMaskModel<F>
where
    F: Fn(&ImageU16<'_>) -> Vec<f32>,
{
    pub fn new(infer: F) -> Self {
        Self {
            infer,
            cutoff: DEFAULT_PROBABILITY_CUTOFF,
        }
    }

    pub fn with_cutoff(mut self, cutoff: f32) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }
}

impl<F> MaskProducer for ProbabilityMaskModel<F>
where
    F: Fn(&ImageU16<'_>) -> Vec<f32>,
{
    fn produce_mask(&self, slice: &ImageU16<'_>) -> Result<BinaryMask, VolumeError> {
        if !self.cutoff.is_finite() {
            return Err(VolumeError::invalid(format!(
                "probability cutoff must be finite, got {}",
                self.cutoff
            )));
        }
        if slice.w == 0 || slice.h == 0 {
            return Err(VolumeError::EmptyVolume);
        }
        let expected = checked_element_count([1, slice.h, slice.w])?;
        let probs = (self.infer)(slice);
        if probs.len() != expected {
            return Err(VolumeError::SampleCountMismatch {
                index: 0,
                expected,
                found: probs.len(),
            });
        }
        let data = probs.iter().map(|&p| u8::from(p > self.cutoff)).collect();
        BinaryMask::from_raw([1, slice.h, slice.w], data)
    }
}

/// Run `producer` on every slice of `volume` and stack the results.
///
/// Slices are independent; with the `parallel` feature they are produced on
/// the rayon pool and stacked in slice order.
pub fn segment_volume_with<P>(producer: &P, volume: &Volume) -> Result<BinaryMask, VolumeError>
where
    P: MaskProducer + Sync + ?Sized,
{
    if volume.is_empty() {
        return Err(VolumeError::EmptyVolume);
    }
    let planes = produce_planes(producer, volume)?;
    let expected = (volume.rows(), volume.cols());
    for (z, plane) in planes.iter().enumerate() {
        if plane.depth() != 1 || (plane.rows(), plane.cols()) != expected {
            return Err(VolumeError::InconsistentGeometry {
                index: z,
                expected,
                found: (plane.rows(), plane.cols()),
            });
        }
    }
    let mask = BinaryMask::from_slices(planes)?;
    debug!(
        "segment_volume_with depth={} set={}",
        mask.depth(),
        mask.count_set()
    );
    Ok(mask)
}

#[cfg(feature = "parallel")]
fn produce_planes<P>(producer: &P, volume: &Volume) -> Result<Vec<BinaryMask>, VolumeError>
where
    P: MaskProducer + Sync + ?Sized,
{
    use rayon::prelude::*;

    (0..volume.depth())
        .into_par_iter()
        .map(|z| {
            producer
                .produce_mask(&volume.slice(z))
                .map_err(|e| e.at_slice(z))
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn produce_planes<P>(producer: &P, volume: &Volume) -> Result<Vec<BinaryMask>, VolumeError>
where
    P: MaskProducer + Sync + ?Sized,
{
    (0..volume.depth())
        .map(|z| {
            producer
                .produce_mask(&volume.slice(z))
                .map_err(|e| e.at_slice(z))
        })
        .collect()
}
