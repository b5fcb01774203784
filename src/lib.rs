#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod anomaly;
pub mod diagnostics;
pub mod error;
pub mod isosurface;
pub mod pipeline;
pub mod regions;
pub mod segment;
pub mod slices;
pub mod volume;

// Tool-facing helpers.
pub mod config;
pub mod image;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::VolumeError;
pub use crate::pipeline::{MarkerCommand, Pipeline, PipelineOutput, PipelineParams, Session};
pub use crate::slices::{Slice, SliceStack};
pub use crate::volume::{Volume, VolumeAssembler};

pub use crate::anomaly::{AnomalyDetector, AnomalyPolicy, Marker, MarkerSet};
pub use crate::isosurface::{IsosurfaceExtractor, Mesh};
pub use crate::regions::{Region, RegionLabeler};
pub use crate::segment::{BinaryMask, MaskProducer, ThresholdSegmenter};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use slice_volume::prelude::*;
///
/// # fn main() -> Result<(), VolumeError> {
/// let (rows, cols) = (64usize, 64usize);
/// let buffers = vec![vec![0u16; rows * cols]; 8];
/// let stack = SliceStack::from_buffers(rows, cols, buffers);
///
/// let pipeline = Pipeline::new(PipelineParams::default())?;
/// let mut session = Session::new();
/// let output = pipeline.run(&stack, &mut session)?;
/// println!(
///     "faces={} regions={} markers={}",
///     output.mesh.map_or(0, |m| m.face_count()),
///     output.labeling.regions.len(),
///     session.markers().len()
/// );
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::{
        Pipeline, PipelineParams, Session, Slice, SliceStack, Volume, VolumeAssembler,
        VolumeError,
    };
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Stage runners.
    pub use crate::anomaly::AnomalyDetector;
    pub use crate::isosurface::{extract_isosurface, IsosurfaceExtractor, IsosurfaceOptions};
    pub use crate::regions::{Connectivity, RegionLabeler};
    pub use crate::segment::{
        segment_volume_with, ProbabilityMaskModel, ThresholdDirection, ThresholdOptions,
        ThresholdSegmenter,
    };
    pub use crate::volume::{assemble_volume, AssemblerOptions, VolumeAssembler};

    // Structured diagnostics types.
    pub use crate::diagnostics::{
        InputDescriptor, MeshSummary, PipelineReport, StageTiming, TimingBreakdown,
    };
}
