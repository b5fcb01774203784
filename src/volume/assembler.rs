use super::{validate_spacing, Volume, UNIT_SPACING};
use crate::error::VolumeError;
use crate::slices::{validate_sorted, Slice, SliceStack};
use log::debug;
use serde::{Deserialize, Serialize};

/// Options for turning a slice stack into a volume.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerOptions {
    /// Physical voxel size `[sx, sy, sz]` (column, row, slice spacing).
    pub spacing: [f32; 3],
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            spacing: UNIT_SPACING,
        }
    }
}

/// Copies validated slices into one contiguous scalar field.
#[derive(Clone, Debug, Default)]
pub struct VolumeAssembler {
    options: AssemblerOptions,
}

impl VolumeAssembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Validate the stack and copy every slice verbatim, ordered by ordinal.
    ///
    /// Nothing is allocated for the output until validation has passed, so a
    /// failure never leaves a partial volume behind.
    pub fn assemble(&self, stack: &SliceStack) -> Result<Volume, VolumeError> {
        self.assemble_sorted(stack.sorted_by_ordinal())
    }

    /// Same as [`assemble`](Self::assemble) for a plain slice sequence.
    pub fn assemble_slices(&self, slices: &[Slice]) -> Result<Volume, VolumeError> {
        let mut sorted: Vec<&Slice> = slices.iter().collect();
        sorted.sort_by_key(|s| s.index);
        self.assemble_sorted(sorted)
    }

    fn assemble_sorted(&self, sorted: Vec<&Slice>) -> Result<Volume, VolumeError> {
        validate_spacing(self.options.spacing)?;
        let geometry = validate_sorted(&sorted)?;
        let depth = sorted.len();
        let mut data = Vec::with_capacity(sorted.iter().map(|s| s.data.len()).sum());
        for slice in &sorted {
            data.extend_from_slice(&slice.data);
        }
        debug!(
            "VolumeAssembler::assemble depth={} rows={} cols={} spacing={:?}",
            depth, geometry.rows, geometry.cols, self.options.spacing
        );
        Volume::new(
            [depth, geometry.rows, geometry.cols],
            data,
            self.options.spacing,
        )
    }
}

/// Assemble with unit spacing.
pub fn assemble_volume(stack: &SliceStack) -> Result<Volume, VolumeError> {
    VolumeAssembler::default().assemble(stack)
}
