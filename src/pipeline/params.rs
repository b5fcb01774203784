use crate::anomaly::AnomalyPolicy;
use crate::isosurface::IsosurfaceOptions;
use crate::regions::Connectivity;
use crate::segment::ThresholdOptions;
use crate::volume::AssemblerOptions;
use serde::{Deserialize, Serialize};

/// Typed parameters for every pipeline stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    pub assembler: AssemblerOptions,
    pub isosurface: IsosurfaceOptions,
    /// Skip the surface branch when false.
    pub extract_surface: bool,
    /// Also mesh the boundary of the segmented mask.
    pub extract_mask_surface: bool,
    pub segmentation: ThresholdOptions,
    pub connectivity: Connectivity,
    pub anomaly: AnomalyPolicy,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            assembler: AssemblerOptions::default(),
            isosurface: IsosurfaceOptions::default(),
            extract_surface: true,
            extract_mask_surface: true,
            segmentation: ThresholdOptions::default(),
            connectivity: Connectivity::default(),
            anomaly: AnomalyPolicy::default(),
        }
    }
}
