use crate::error::{checked_element_count, VolumeError};

/// 0/1 field aligned with a volume (`depth > 1`) or a single slice (`depth == 1`).
///
/// Layout matches [`Volume`](crate::volume::Volume): `(z * rows + y) * cols + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    depth: usize,
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// All-zero mask of shape `[depth, rows, cols]`.
    pub fn zeros(dims: [usize; 3]) -> Result<Self, VolumeError> {
        let len = checked_element_count(dims)?;
        Self::from_raw(dims, vec![0; len])
    }

    /// Wrap raw labels; any non-zero element is stored as 1.
    pub fn from_raw(dims: [usize; 3], mut data: Vec<u8>) -> Result<Self, VolumeError> {
        let [depth, rows, cols] = dims;
        let required = checked_element_count(dims)?;
        if data.len() != required {
            return Err(VolumeError::invalid(format!(
                "mask buffer holds {} elements, dims {depth}x{rows}x{cols} require {required}",
                data.len()
            )));
        }
        for v in data.iter_mut() {
            *v = u8::from(*v != 0);
        }
        Ok(Self {
            depth,
            rows,
            cols,
            data,
        })
    }

    /// Stack per-slice masks along z. Every plane must share rows/cols.
    pub fn from_slices(planes: Vec<BinaryMask>) -> Result<Self, VolumeError> {
        let first = planes.first().ok_or(VolumeError::EmptyVolume)?;
        let (rows, cols) = (first.rows, first.cols);
        let mut depth = 0;
        let mut data = Vec::with_capacity(planes.iter().map(|p| p.data.len()).sum());
        for plane in &planes {
            if (plane.rows, plane.cols) != (rows, cols) {
                return Err(VolumeError::InconsistentGeometry {
                    index: depth,
                    expected: (rows, cols),
                    found: (plane.rows, plane.cols),
                });
            }
            depth += plane.depth;
            data.extend_from_slice(&plane.data);
        }
        Ok(Self {
            depth,
            rows,
            cols,
            data,
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

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, z: usize, y: usize, x: usize) -> usize {
        (z * self.rows + y) * self.cols + x
    }

    #[inline]
    pub fn get(&self, z: usize, y: usize, x: usize) -> bool {
        self.data[self.index(z, y, x)] != 0
    }

    #[inline]
    pub fn set(&mut self, z: usize, y: usize, x: usize, on: bool) {
        let i = self.index(z, y, x);
        self.data[i] = u8::from(on);
    }

    /// Elements of plane `z`. Panics if `z >= depth`.
    pub fn plane(&self, z: usize) -> &[u8] {
        let n = self.rows * self.cols;
        &self.data[z * n..(z + 1) * n]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of set elements.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_normalizes_to_zero_one() {
        let mask = BinaryMask::from_raw([1, 1, 3], vec![0, 7, 255]).unwrap();
        assert_eq!(mask.as_slice(), &[0, 1, 1]);
        assert_eq!(mask.count_set(), 2);
    }

    #[test]
    fn overflowing_dims_are_rejected() {
        assert!(matches!(
            BinaryMask::from_raw([usize::MAX, 2, 2], vec![0; 4]),
            Err(VolumeError::InvalidConfiguration(_))
        ));
        assert!(BinaryMask::zeros([usize::MAX / 2, 3, 1]).is_err());
    }

    #[test]
    fn stacking_rejects_mismatched_planes() {
        let a = BinaryMask::zeros([1, 2, 2]).unwrap();
        let b = BinaryMask::zeros([1, 2, 3]).unwrap();
        assert_eq!(
            BinaryMask::from_slices(vec![a.clone(), b]),
            Err(VolumeError::InconsistentGeometry {
                index: 1,
                expected: (2, 2),
                found: (2, 3)
            })
        );
        let stacked = BinaryMask::from_slices(vec![a.clone(), a]).unwrap();
        assert_eq!(stacked.dims(), [2, 2, 2]);
        assert_eq!(
            BinaryMask::from_slices(Vec::new()),
            Err(VolumeError::EmptyVolume)
        );
    }
}
