use super::mask::BinaryMask;
use super::producer::MaskProducer;
use crate::error::VolumeError;
use crate::image::{ImageU16, ImageView};
use crate::volume::Volume;
use log::debug;
use serde::{Deserialize, Serialize};

/// Which side of the threshold is set in the mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdDirection {
    /// `value > threshold`
    #[serde(alias = "above")]
    Above,
    /// `value < threshold`
    #[serde(alias = "below")]
    Below,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOptions {
    pub threshold: f32,
    pub direction: ThresholdDirection,
}

impl Default for ThresholdOptions {
    fn default() -> Self {
        Self {
            threshold: 1000.0,
            direction: ThresholdDirection::Above,
        }
    }
}

/// Elementwise strict comparison against a fixed threshold.
#[derive(Clone, Debug)]
pub struct ThresholdSegmenter {
    options: ThresholdOptions,
}

impl ThresholdSegmenter {
    pub fn new(options: ThresholdOptions) -> Result<Self, VolumeError> {
        if !options.threshold.is_finite() {
            return Err(VolumeError::invalid(format!(
                "segmentation threshold must be finite, got {}",
                options.threshold
            )));
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &ThresholdOptions {
        &self.options
    }

    #[inline]
    pub fn is_set(&self, value: u16) -> bool {
        let v = value as f32;
        match self.options.direction {
            ThresholdDirection::Above => v > self.options.threshold,
            ThresholdDirection::Below => v < self.options.threshold,
        }
    }

    /// Binarize a flat buffer without shape information.
    pub fn segment_values(&self, values: &[u16]) -> Vec<u8> {
        values.iter().map(|&v| u8::from(self.is_set(v))).collect()
    }

    pub fn segment_volume(&self, volume: &Volume) -> Result<BinaryMask, VolumeError> {
        if volume.is_empty() {
            return Err(VolumeError::EmptyVolume);
        }
        let mask = BinaryMask::from_raw(volume.dims(), self.segment_values(volume.as_slice()))?;
        debug!(
            "ThresholdSegmenter::segment_volume threshold={} direction={:?} set={}/{}",
            self.options.threshold,
            self.options.direction,
            mask.count_set(),
            mask.len()
        );
        Ok(mask)
    }

    /// Binarize one slice into a depth-1 mask.
    pub fn segment_slice(&self, slice: &ImageU16<'_>) -> Result<BinaryMask, VolumeError> {
        if slice.w == 0 || slice.h == 0 {
            return Err(VolumeError::EmptyVolume);
        }
        if slice.stride < slice.w {
            return Err(VolumeError::invalid(format!(
                "slice stride {} is shorter than its width {}",
                slice.stride, slice.w
            )));
        }
        if !slice.is_well_formed() {
            let expected = slice.required_len().ok_or_else(|| {
                VolumeError::invalid(format!(
                    "slice shape {}x{} with stride {} overflows",
                    slice.h, slice.w, slice.stride
                ))
            })?;
            return Err(VolumeError::SampleCountMismatch {
                index: 0,
                expected,
                found: slice.data.len(),
            });
        }
        let mut data = Vec::with_capacity(slice.w * slice.h);
        for row in slice.rows() {
            data.extend(row.iter().map(|&v| u8::from(self.is_set(v))));
        }
        BinaryMask::from_raw([1, slice.h, slice.w], data)
    }
}

impl MaskProducer for ThresholdSegmenter {
    fn produce_mask(&self, slice: &ImageU16<'_>) -> Result<BinaryMask, VolumeError> {
        self.segment_slice(slice)
    }
}
