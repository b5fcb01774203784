//! Dense 3D scalar field assembled from a slice stack.
//!
//! Layout is `(depth, rows, cols)` row-major: element `(z, y, x)` lives at
//! `(z * rows + y) * cols + x`. Physical coordinates follow the same axes as
//! the mesh output: x = column, y = row, z = slice, each scaled by `spacing`.
//!
//! A `Volume` is immutable once built; stages borrow it read-only, so an
//! in-flight extraction can be dropped at any point without touching it.

mod assembler;
mod reslice;

pub use assembler::{assemble_volume, AssemblerOptions, VolumeAssembler};

use crate::error::{checked_element_count, VolumeError};
use crate::image::ImageU16;

pub const UNIT_SPACING: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    depth: usize,
    rows: usize,
    cols: usize,
    data: Vec<u16>,
    spacing: [f32; 3],
}

impl Volume {
    /// Wrap a row-major buffer of shape `[depth, rows, cols]`.
    ///
    /// Zero-length axes are allowed here; stages that need samples reject
    /// them with [`VolumeError::EmptyVolume`].
    pub fn new(dims: [usize; 3], data: Vec<u16>, spacing: [f32; 3]) -> Result<Self, VolumeError> {
        let [depth, rows, cols] = dims;
        let required = checked_element_count(dims)?;
        if data.len() != required {
            return Err(VolumeError::invalid(format!(
                "buffer holds {} samples, dims {depth}x{rows}x{cols} require {required}",
                data.len()
            )));
        }
        validate_spacing(spacing)?;
        Ok(Self {
            depth,
            rows,
            cols,
            data,
            spacing,
        })
    }

    /// `[depth, rows, cols]`
    pub fn dims(&self) -> [usize; 3] {
        [self.depth, self.rows, self.cols]
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Physical voxel size `[sx, sy, sz]` (column, row, slice).
    pub fn spacing(&self) -> [f32; 3] {
        self.spacing
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when any axis has zero length.
    pub fn is_empty(&self) -> bool {
        self.depth == 0 || self.rows == 0 || self.cols == 0
    }

    #[inline]
    pub fn index(&self, z: usize, y: usize, x: usize) -> usize {
        (z * self.rows + y) * self.cols + x
    }

    #[inline]
    pub fn get(&self, z: usize, y: usize, x: usize) -> u16 {
        self.data[self.index(z, y, x)]
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }

    /// Borrow slice `z` as an image. Panics if `z >= depth`.
    pub fn slice(&self, z: usize) -> ImageU16<'_> {
        let plane = self.rows * self.cols;
        ImageU16::packed(self.cols, self.rows, &self.data[z * plane..(z + 1) * plane])
    }

    /// Minimum and maximum sample, `None` for an empty volume.
    pub fn value_range(&self) -> Option<(u16, u16)> {
        let first = *self.data.first()?;
        Some(
            self.data
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Map index-space `[x, y, z]` to physical coordinates.
    #[inline]
    pub fn to_physical(&self, p: [f32; 3]) -> [f32; 3] {
        [
            p[0] * self.spacing[0],
            p[1] * self.spacing[1],
            p[2] * self.spacing[2],
        ]
    }
}

pub(crate) fn validate_spacing(spacing: [f32; 3]) -> Result<(), VolumeError> {
    if spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
        Ok(())
    } else {
        Err(VolumeError::invalid(format!(
            "spacing must be finite and positive, got {spacing:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn indexing_is_slice_row_col() {
        let data: Vec<u16> = (0..24).collect();
        let vol = Volume::new([2, 3, 4], data, UNIT_SPACING).unwrap();
        assert_eq!(vol.get(1, 2, 3), 23);
        assert_eq!(vol.get(1, 0, 0), 12);
        assert_eq!(vol.slice(1).row(1), &[16, 17, 18, 19]);
        assert_eq!(vol.value_range(), Some((0, 23)));
    }

    #[test]
    fn rejects_wrong_length_and_bad_spacing() {
        assert!(matches!(
            Volume::new([1, 2, 2], vec![0; 3], UNIT_SPACING),
            Err(VolumeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Volume::new([1, 1, 1], vec![0], [1.0, 0.0, 1.0]),
            Err(VolumeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn overflowing_dims_are_rejected() {
        assert!(matches!(
            Volume::new([usize::MAX, 2, 2], vec![0; 4], UNIT_SPACING),
            Err(VolumeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_axis_volume_is_empty() {
        let vol = Volume::new([0, 4, 4], Vec::new(), UNIT_SPACING).unwrap();
        assert!(vol.is_empty());
        assert_eq!(vol.value_range(), None);
    }
}
