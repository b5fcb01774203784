//! Error taxonomy shared by every pipeline stage.
//!
//! All variants describe malformed but well-typed input. They are returned to
//! the caller; none of the stages panic on them. Degenerate numeric cases
//! (flat marching-cubes edges, all-zero masks) are not errors.

/// Reasons a pipeline stage can reject its input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VolumeError {
    /// A slice (or mask/probability map) does not match the stack geometry.
    InconsistentGeometry {
        /// Ordinal of the offending slice.
        index: usize,
        /// `(rows, cols)` required by the first slice.
        expected: (usize, usize),
        /// `(rows, cols)` actually found.
        found: (usize, usize),
    },
    /// A buffer does not hold `rows * cols` samples for its declared shape.
    SampleCountMismatch {
        /// Ordinal of the offending slice.
        index: usize,
        /// Samples required by the declared shape.
        expected: usize,
        /// Samples actually present.
        found: usize,
    },
    /// Sorted ordinals do not form the contiguous range `0..N`.
    MissingOrDuplicateIndex {
        /// Ordinal expected at this position of the sorted sequence.
        expected: usize,
        /// Ordinal found instead.
        found: usize,
    },
    /// Input has zero elements along at least one axis.
    EmptyVolume,
    /// A configuration value is missing or out of its valid domain.
    InvalidConfiguration(String),
}

impl VolumeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        VolumeError::InvalidConfiguration(msg.into())
    }

    /// Re-address a per-slice error to slice `z` of a stack.
    pub(crate) fn at_slice(self, z: usize) -> Self {
        match self {
            VolumeError::InconsistentGeometry {
                expected, found, ..
            } => VolumeError::InconsistentGeometry {
                index: z,
                expected,
                found,
            },
            VolumeError::SampleCountMismatch {
                expected, found, ..
            } => VolumeError::SampleCountMismatch {
                index: z,
                expected,
                found,
            },
            other => other,
        }
    }
}

/// Element count of a `[depth, rows, cols]` grid, `None` on overflow.
pub(crate) fn element_count(dims: [usize; 3]) -> Option<usize> {
    dims[0].checked_mul(dims[1])?.checked_mul(dims[2])
}

/// Like [`element_count`] but reports overflow as a configuration error.
pub(crate) fn checked_element_count(dims: [usize; 3]) -> Result<usize, VolumeError> {
    element_count(dims).ok_or_else(|| {
        VolumeError::invalid(format!(
            "dims {}x{}x{} overflow the addressable element count",
            dims[0], dims[1], dims[2]
        ))
    })
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeError::InconsistentGeometry {
                index,
                expected,
                found,
            } => write!(
                f,
                "inconsistent geometry at slice {index}: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            VolumeError::SampleCountMismatch {
                index,
                expected,
                found,
            } => write!(
                f,
                "slice {index} holds {found} samples, its shape requires {expected}"
            ),
            VolumeError::MissingOrDuplicateIndex { expected, found } => write!(
                f,
                "slice ordinals are not contiguous (expected {expected}, found {found})"
            ),
            VolumeError::EmptyVolume => write!(f, "volume has a zero-length axis"),
            VolumeError::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for VolumeError {}
