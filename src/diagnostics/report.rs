use super::timing::TimingBreakdown;
use crate::anomaly::AnomalyReport;
use crate::isosurface::Mesh;
use crate::volume::Volume;
use serde::Serialize;

/// Summary of one pipeline run, written by the pipeline tool.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub input: InputDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_mesh: Option<MeshSummary>,
    pub mask_voxels: usize,
    pub region_count: usize,
    pub anomalies: AnomalyReport,
    pub timings: TimingBreakdown,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub depth: usize,
    pub rows: usize,
    pub cols: usize,
    pub spacing: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_range: Option<(u16, u16)>,
}

impl InputDescriptor {
    pub fn from_volume(volume: &Volume) -> Self {
        Self {
            depth: volume.depth(),
            rows: volume.rows(),
            cols: volume.cols(),
            spacing: volume.spacing(),
            value_range: volume.value_range(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshSummary {
    pub vertices: usize,
    pub faces: usize,
    pub surface_area: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<([f32; 3], [f32; 3])>,
}

impl MeshSummary {
    pub fn from_mesh(mesh: &Mesh) -> Self {
        Self {
            vertices: mesh.vertex_count(),
            faces: mesh.face_count(),
            surface_area: mesh.surface_area(),
            bounds: mesh.bounds(),
        }
    }
}
