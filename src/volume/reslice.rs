//! Orthogonal reslicing of an assembled volume.
//!
//! - coronal plane at a fixed row: width = cols, height = depth.
//! - sagittal plane at a fixed column: width = rows, height = depth.
//!
//! Row `z` of the output is slice `z` of the volume, so the slice axis runs
//! top to bottom.
use super::Volume;
use crate::error::VolumeError;
use crate::image::{GrayImageU16, ImageViewMut};

impl Volume {
    /// Plane of constant `row` (all slices, all columns).
    pub fn coronal(&self, row: usize) -> Result<GrayImageU16, VolumeError> {
        if row >= self.rows {
            return Err(VolumeError::invalid(format!(
                "coronal row {row} out of range (rows {})",
                self.rows
            )));
        }
        let mut out = GrayImageU16::new(self.cols, self.depth);
        for z in 0..self.depth {
            let start = self.index(z, row, 0);
            out.row_mut(z)
                .copy_from_slice(&self.data[start..start + self.cols]);
        }
        Ok(out)
    }

    /// Plane of constant `col` (all slices, all rows).
    pub fn sagittal(&self, col: usize) -> Result<GrayImageU16, VolumeError> {
        if col >= self.cols {
            return Err(VolumeError::invalid(format!(
                "sagittal column {col} out of range (cols {})",
                self.cols
            )));
        }
        let mut out = GrayImageU16::new(self.rows, self.depth);
        for z in 0..self.depth {
            let dst = out.row_mut(z);
            for (y, px) in dst.iter_mut().enumerate() {
                *px = self.data[self.index(z, y, col)];
            }
        }
        Ok(out)
    }
}
