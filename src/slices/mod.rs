//! Ordered collection of 2D scalar slices sharing one geometry.
//!
//! A `SliceStack` accepts slices in any order; ordering is by each slice's
//! ordinal. Validation (`SliceStack::validate`) is what the volume assembler
//! relies on:
//! - the stack is non-empty and the first slice has non-zero rows/cols,
//! - every slice matches the lowest-ordinal slice's `(rows, cols)` and
//!   carries exactly `rows * cols` samples (a shape whose sample count
//!   overflows `usize` is rejected, never wrapped),
//! - sorted ordinals form the contiguous range `0..N`.
use crate::error::{element_count, VolumeError};
use crate::image::ImageU16;
use serde::{Deserialize, Serialize};

/// Shared row/column count of every slice in a stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceGeometry {
    pub rows: usize,
    pub cols: usize,
}

impl SliceGeometry {
    /// `rows * cols`, `None` when the product overflows.
    pub fn sample_count(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

/// One cross-section: ordinal index plus a row-major 16-bit buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slice {
    pub index: usize,
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<u16>,
}

impl Slice {
    pub fn new(index: usize, rows: usize, cols: usize, data: Vec<u16>) -> Self {
        Self {
            index,
            rows,
            cols,
            data,
        }
    }

    pub fn geometry(&self) -> SliceGeometry {
        SliceGeometry {
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Borrow the buffer as an image (x = column, y = row).
    pub fn view(&self) -> ImageU16<'_> {
        ImageU16::packed(self.cols, self.rows, &self.data)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SliceStack {
    slices: Vec<Slice>,
}

impl SliceStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack from buffers in sequence order, assigning ordinals `0..N`.
    pub fn from_buffers(rows: usize, cols: usize, buffers: Vec<Vec<u16>>) -> Self {
        let slices = buffers
            .into_iter()
            .enumerate()
            .map(|(i, data)| Slice::new(i, rows, cols, data))
            .collect();
        Self { slices }
    }

    pub fn push(&mut self, slice: Slice) {
        self.slices.push(slice);
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Slices in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Slice> {
        self.slices.iter()
    }

    /// Slices ordered by ascending ordinal (stable for duplicates).
    pub fn sorted_by_ordinal(&self) -> Vec<&Slice> {
        let mut sorted: Vec<&Slice> = self.slices.iter().collect();
        sorted.sort_by_key(|s| s.index);
        sorted
    }

    /// Check shape and ordinal invariants, returning the shared geometry.
    pub fn validate(&self) -> Result<SliceGeometry, VolumeError> {
        let sorted = self.sorted_by_ordinal();
        validate_sorted(&sorted)
    }
}

impl FromIterator<Slice> for SliceStack {
    fn from_iter<T: IntoIterator<Item = Slice>>(iter: T) -> Self {
        Self {
            slices: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn validate_sorted(sorted: &[&Slice]) -> Result<SliceGeometry, VolumeError> {
    let first = sorted.first().ok_or(VolumeError::EmptyVolume)?;
    let geometry = first.geometry();
    if geometry.is_empty() {
        return Err(VolumeError::EmptyVolume);
    }
    let samples = geometry.sample_count().ok_or_else(|| {
        VolumeError::invalid(format!(
            "slice {} shape {}x{} overflows the addressable sample count",
            first.index, geometry.rows, geometry.cols
        ))
    })?;
    // the assembled volume must be addressable too
    if element_count([sorted.len(), geometry.rows, geometry.cols]).is_none() {
        return Err(VolumeError::invalid(format!(
            "{} slices of {}x{} overflow the addressable sample count",
            sorted.len(),
            geometry.rows,
            geometry.cols
        )));
    }
    let expected = (geometry.rows, geometry.cols);
    for slice in sorted {
        let found = (slice.rows, slice.cols);
        if found != expected {
            return Err(VolumeError::InconsistentGeometry {
                index: slice.index,
                expected,
                found,
            });
        }
        if slice.data.len() != samples {
            return Err(VolumeError::SampleCountMismatch {
                index: slice.index,
                expected: samples,
                found: slice.data.len(),
            });
        }
    }
    for (position, slice) in sorted.iter().enumerate() {
        if slice.index != position {
            return Err(VolumeError::MissingOrDuplicateIndex {
                expected: position,
                found: slice.index,
            });
        }
    }
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(index: usize, rows: usize, cols: usize) -> Slice {
        Slice::new(index, rows, cols, vec![index as u16; rows * cols])
    }

    #[test]
    fn out_of_order_stack_validates() {
        let stack: SliceStack = [slice(2, 3, 4), slice(0, 3, 4), slice(1, 3, 4)]
            .into_iter()
            .collect();
        let geometry = stack.validate().expect("contiguous ordinals");
        assert_eq!(geometry, SliceGeometry { rows: 3, cols: 4 });
        let order: Vec<usize> = stack.sorted_by_ordinal().iter().map(|s| s.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn duplicate_ordinal_is_reported() {
        let stack: SliceStack = [slice(0, 2, 2), slice(1, 2, 2), slice(1, 2, 2)]
            .into_iter()
            .collect();
        assert_eq!(
            stack.validate(),
            Err(VolumeError::MissingOrDuplicateIndex {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn gap_in_ordinals_is_reported() {
        let stack: SliceStack = [slice(0, 2, 2), slice(2, 2, 2)].into_iter().collect();
        assert_eq!(
            stack.validate(),
            Err(VolumeError::MissingOrDuplicateIndex {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn short_buffer_reports_sample_count() {
        let mut stack = SliceStack::new();
        stack.push(slice(0, 2, 3));
        stack.push(Slice::new(1, 2, 3, vec![0; 5]));
        assert_eq!(
            stack.validate(),
            Err(VolumeError::SampleCountMismatch {
                index: 1,
                expected: 6,
                found: 5
            })
        );
    }

    #[test]
    fn overflowing_shape_is_rejected() {
        let mut stack = SliceStack::new();
        stack.push(Slice::new(0, usize::MAX / 2, 3, vec![0; 4]));
        assert!(matches!(
            stack.validate(),
            Err(VolumeError::InvalidConfiguration(_))
        ));

        let geometry = SliceGeometry {
            rows: usize::MAX,
            cols: 2,
        };
        assert_eq!(geometry.sample_count(), None);
    }

    #[test]
    fn empty_stack_is_empty_volume() {
        assert_eq!(SliceStack::new().validate(), Err(VolumeError::EmptyVolume));
        let stack = SliceStack::from_buffers(0, 4, vec![Vec::new()]);
        assert_eq!(stack.validate(), Err(VolumeError::EmptyVolume));
    }
}
