use super::mesh::Mesh;
use super::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
use crate::error::VolumeError;
use crate::segment::BinaryMask;
use crate::volume::{self, Volume};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Options for isosurface extraction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsosurfaceOptions {
    /// Scalar level to extract. Values outside the data range give an empty mesh.
    pub isovalue: f32,
    /// Share one vertex between all cells touching the same crossing edge.
    pub deduplicate_vertices: bool,
}

impl Default for IsosurfaceOptions {
    fn default() -> Self {
        Self {
            isovalue: 1500.0,
            deduplicate_vertices: true,
        }
    }
}

/// Marching-cubes extractor over an assembled volume.
#[derive(Clone, Debug, Default)]
pub struct IsosurfaceExtractor {
    options: IsosurfaceOptions,
}

/// Isovalue separating unset (0) from set (1) mask voxels.
pub const MASK_ISOVALUE: f32 = 0.5;

/// Sampled grid the marcher reads cell corners from.
trait ScalarField: Sync {
    /// `[depth, rows, cols]`
    fn dims(&self) -> [usize; 3];
    fn sample(&self, z: usize, y: usize, x: usize) -> f32;
    fn spacing(&self) -> [f32; 3];

    #[inline]
    fn linear_index(&self, z: usize, y: usize, x: usize) -> usize {
        let [_, rows, cols] = self.dims();
        (z * rows + y) * cols + x
    }
}

impl ScalarField for Volume {
    fn dims(&self) -> [usize; 3] {
        Volume::dims(self)
    }

    #[inline]
    fn sample(&self, z: usize, y: usize, x: usize) -> f32 {
        self.get(z, y, x) as f32
    }

    fn spacing(&self) -> [f32; 3] {
        Volume::spacing(self)
    }
}

/// Binary mask sampled as 0.0 / 1.0 with an explicit voxel size.
struct MaskField<'a> {
    mask: &'a BinaryMask,
    spacing: [f32; 3],
}

impl ScalarField for MaskField<'_> {
    fn dims(&self) -> [usize; 3] {
        self.mask.dims()
    }

    #[inline]
    fn sample(&self, z: usize, y: usize, x: usize) -> f32 {
        if self.mask.get(z, y, x) {
            1.0
        } else {
            0.0
        }
    }

    fn spacing(&self) -> [f32; 3] {
        self.spacing
    }
}

/// Output of one layer of cells (between slices `z` and `z + 1`).
///
/// Vertex indices in `faces` are local to the layer; `keys` identifies the
/// volume edge each local vertex lies on so layers can be stitched.
#[derive(Default)]
struct LayerOutput {
    points: Vec<[f32; 3]>,
    keys: Vec<u64>,
    faces: Vec<[u32; 3]>,
}

impl IsosurfaceExtractor {
    pub fn new(options: IsosurfaceOptions) -> Self {
        Self { options }
    }

    pub fn with_isovalue(isovalue: f32) -> Self {
        Self::new(IsosurfaceOptions {
            isovalue,
            ..Default::default()
        })
    }

    pub fn options(&self) -> &IsosurfaceOptions {
        &self.options
    }

    /// Extract the level set `{v : volume(v) = isovalue}` as a triangle mesh.
    ///
    /// Vertex coordinates are physical: `(col * sx, row * sy, slice * sz)`.
    /// Output depends only on `(volume, options)`; the parallel feature does
    /// not change vertex or face order.
    pub fn extract(&self, volume: &Volume) -> Result<Mesh, VolumeError> {
        let iso = self.options.isovalue;
        if !iso.is_finite() {
            return Err(VolumeError::invalid(format!(
                "isovalue must be finite, got {iso}"
            )));
        }
        if volume.is_empty() {
            return Err(VolumeError::EmptyVolume);
        }
        Ok(self.march(volume, iso))
    }

    /// Boundary surface of the set voxels of `mask`, extracted at
    /// [`MASK_ISOVALUE`] regardless of the configured isovalue.
    ///
    /// `spacing` is the physical voxel size `[sx, sy, sz]`, normally the
    /// spacing of the volume the mask was segmented from.
    pub fn extract_mask(
        &self,
        mask: &BinaryMask,
        spacing: [f32; 3],
    ) -> Result<Mesh, VolumeError> {
        volume::validate_spacing(spacing)?;
        if mask.is_empty() {
            return Err(VolumeError::EmptyVolume);
        }
        Ok(self.march(&MaskField { mask, spacing }, MASK_ISOVALUE))
    }

    fn march<G: ScalarField>(&self, field: &G, iso: f32) -> Mesh {
        let [depth, rows, cols] = field.dims();
        if depth < 2 || rows < 2 || cols < 2 {
            debug!(
                "IsosurfaceExtractor::march dims={:?} has no complete cells",
                field.dims()
            );
            return Mesh::new();
        }

        let start = Instant::now();
        let layers = self.march_layers(field, iso, depth - 1);
        let mesh = self.stitch(field, layers);
        debug!(
            "IsosurfaceExtractor::march iso={} cells={}x{}x{} vertices={} faces={} elapsed_ms={:.3}",
            iso,
            cols - 1,
            rows - 1,
            depth - 1,
            mesh.vertex_count(),
            mesh.face_count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        mesh
    }

    #[cfg(feature = "parallel")]
    fn march_layers<G: ScalarField>(
        &self,
        field: &G,
        iso: f32,
        layers: usize,
    ) -> Vec<LayerOutput> {
        use rayon::prelude::*;

        (0..layers)
            .into_par_iter()
            .map(|z| self.march_layer(field, iso, z))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn march_layers<G: ScalarField>(
        &self,
        field: &G,
        iso: f32,
        layers: usize,
    ) -> Vec<LayerOutput> {
        (0..layers).map(|z| self.march_layer(field, iso, z)).collect()
    }

    fn march_layer<G: ScalarField>(&self, field: &G, iso: f32, z: usize) -> LayerOutput {
        let [_, rows, cols] = field.dims();
        let spacing = field.spacing();
        let dedupe = self.options.deduplicate_vertices;
        let mut out = LayerOutput::default();
        let mut local: HashMap<u64, u32> = HashMap::new();

        for y in 0..rows - 1 {
            for x in 0..cols - 1 {
                let mut values = [0.0f32; 8];
                let mut config = 0usize;
                for (i, off) in CORNER_OFFSETS.iter().enumerate() {
                    let v = field.sample(z + off[2], y + off[1], x + off[0]);
                    values[i] = v;
                    if v < iso {
                        config |= 1usize << i;
                    }
                }
                let crossing = EDGE_TABLE[config];
                if crossing == 0 {
                    continue;
                }

                let mut edge_vertex: [Option<u32>; 12] = [None; 12];
                for (e, &[a, b]) in EDGE_CORNERS.iter().enumerate() {
                    if crossing & (1u16 << e) == 0 {
                        continue;
                    }
                    let (v0, v1) = (values[a], values[b]);
                    if v1 == v0 {
                        // flat edge: no crossing
                        continue;
                    }
                    let t = ((iso - v0) / (v1 - v0)).clamp(0.0, 1.0);
                    let key = edge_key(field, [x, y, z], a, b);
                    if dedupe {
                        if let Some(&id) = local.get(&key) {
                            edge_vertex[e] = Some(id);
                            continue;
                        }
                    }
                    let pa = CORNER_OFFSETS[a];
                    let pb = CORNER_OFFSETS[b];
                    let mut p = [0.0f32; 3];
                    for k in 0..3 {
                        let ca = ([x, y, z][k] + pa[k]) as f32;
                        let cb = ([x, y, z][k] + pb[k]) as f32;
                        p[k] = (ca + t * (cb - ca)) * spacing[k];
                    }
                    let id = out.points.len() as u32;
                    out.points.push(p);
                    out.keys.push(key);
                    if dedupe {
                        local.insert(key, id);
                    }
                    edge_vertex[e] = Some(id);
                }

                for tri in TRI_TABLE[config].chunks_exact(3) {
                    if tri[0] < 0 {
                        break;
                    }
                    let ids = (
                        edge_vertex[tri[0] as usize],
                        edge_vertex[tri[1] as usize],
                        edge_vertex[tri[2] as usize],
                    );
                    if let (Some(i0), Some(i1), Some(i2)) = ids {
                        out.faces.push([i0, i1, i2]);
                    }
                }
            }
        }
        out
    }

    /// Concatenate layers in z order, merging vertices on shared edges.
    fn stitch<G: ScalarField>(&self, field: &G, layers: Vec<LayerOutput>) -> Mesh {
        let total_points: usize = layers.iter().map(|l| l.points.len()).sum();
        let total_faces: usize = layers.iter().map(|l| l.faces.len()).sum();
        let mut mesh = Mesh {
            vertices: Vec::with_capacity(total_points),
            faces: Vec::with_capacity(total_faces),
        };
        let mut global: HashMap<u64, u32> = HashMap::new();
        let mut remap: Vec<u32> = Vec::new();
        // Only the top plane of a layer is shared with the next one.
        let [_, rows, cols] = field.dims();
        let plane = (rows * cols) as u64 * 3;

        for (z, layer) in layers.into_iter().enumerate() {
            remap.clear();
            let shared_from = (z as u64 + 1) * plane;
            for (point, key) in layer.points.into_iter().zip(layer.keys) {
                if self.options.deduplicate_vertices {
                    if let Some(&id) = global.get(&key) {
                        remap.push(id);
                        continue;
                    }
                }
                let id = mesh.vertices.len() as u32;
                mesh.vertices.push(point);
                if self.options.deduplicate_vertices && key >= shared_from {
                    global.insert(key, id);
                }
                remap.push(id);
            }
            // keys below this layer's top plane can never be seen again
            global.retain(|&k, _| k >= shared_from);
            mesh.faces.extend(
                layer
                    .faces
                    .iter()
                    .map(|f| [remap[f[0] as usize], remap[f[1] as usize], remap[f[2] as usize]]),
            );
        }
        mesh
    }
}

/// Unique id of the volume edge between corners `a` and `b` of the cell at
/// `cell = [x, y, z]`: lower endpoint's linear index times three plus axis.
#[inline]
fn edge_key<G: ScalarField>(field: &G, cell: [usize; 3], a: usize, b: usize) -> u64 {
    let pa = CORNER_OFFSETS[a];
    let pb = CORNER_OFFSETS[b];
    let axis = (0..3).find(|&k| pa[k] != pb[k]).unwrap_or(0);
    let lo = if pa[axis] < pb[axis] { pa } else { pb };
    let idx = field.linear_index(cell[2] + lo[2], cell[1] + lo[1], cell[0] + lo[0]);
    idx as u64 * 3 + axis as u64
}

/// Extract with default options and the given isovalue.
pub fn extract_isosurface(volume: &Volume, isovalue: f32) -> Result<Mesh, VolumeError> {
    IsosurfaceExtractor::with_isovalue(isovalue).extract(volume)
}
