use serde::{Deserialize, Serialize};

/// Which elements count as neighbours while growing a region.
///
/// Both modes are face-adjacent: `Volumetric` links all six face neighbours
/// of a voxel, `PerSlice` only the four in-plane ones so every z-plane is
/// labelled on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Connectivity {
    #[default]
    Volumetric,
    PerSlice,
}

/// Inclusive axis-aligned extent in index space, ordered `[x, y, z]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [usize; 3],
    pub max: [usize; 3],
}

impl BoundingBox {
    /// Number of elements covered along each axis.
    pub fn size(&self) -> [usize; 3] {
        [
            self.max[0] - self.min[0] + 1,
            self.max[1] - self.min[1] + 1,
            self.max[2] - self.min[2] + 1,
        ]
    }

    pub fn contains(&self, p: [usize; 3]) -> bool {
        (0..3).all(|k| p[k] >= self.min[k] && p[k] <= self.max[k])
    }
}

/// One connected component of a binary mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Positive label, unique within one labelling pass.
    pub label: u32,
    /// Number of member elements.
    pub area: usize,
    /// Mean member coordinate `[x, y, z]` in mask index space.
    pub centroid: [f32; 3],
    pub bbox: BoundingBox,
    /// Standard deviations along the principal axes, largest first.
    pub spread: [f32; 3],
}

impl Region {
    /// Ratio of the major to the middle principal spread (>= 1).
    pub fn elongation(&self) -> f32 {
        if self.spread[1] > 0.0 {
            self.spread[0] / self.spread[1]
        } else {
            1.0
        }
    }
}

/// Per-element label image sharing the mask layout; 0 marks background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    depth: usize,
    rows: usize,
    cols: usize,
    labels: Vec<u32>,
}

impl LabelMap {
    pub(crate) fn from_raw(dims: [usize; 3], labels: Vec<u32>) -> Self {
        let [depth, rows, cols] = dims;
        debug_assert_eq!(labels.len(), depth * rows * cols);
        Self {
            depth,
            rows,
            cols,
            labels,
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        [self.depth, self.rows, self.cols]
    }

    pub fn get(&self, z: usize, y: usize, x: usize) -> u32 {
        self.labels[(z * self.rows + y) * self.cols + x]
    }

    pub fn plane(&self, z: usize) -> &[u32] {
        let plane = self.rows * self.cols;
        &self.labels[z * plane..(z + 1) * plane]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.labels
    }
}

/// Result of one labelling pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Labeling {
    pub labels: LabelMap,
    pub regions: Vec<Region>,
}

impl Labeling {
    pub fn region(&self, label: u32) -> Option<&Region> {
        // labels are dense and start at 1
        let idx = (label as usize).checked_sub(1)?;
        self.regions.get(idx).filter(|r| r.label == label)
    }
}
