use super::accumulator::RegionAccumulator;
use super::types::{Connectivity, LabelMap, Labeling, Region};
use crate::segment::BinaryMask;
use log::debug;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Connected-component labelling of binary masks by stack-based flood fill.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegionLabeler {
    connectivity: Connectivity,
}

impl RegionLabeler {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Label using the configured connectivity.
    pub fn run(&self, mask: &BinaryMask) -> Labeling {
        match self.connectivity {
            Connectivity::Volumetric => self.label(mask),
            Connectivity::PerSlice => self.label_slices(mask),
        }
    }

    /// Label 6-connected components across the whole volume.
    pub fn label(&self, mask: &BinaryMask) -> Labeling {
        let start = Instant::now();
        let (labels, regions) = FloodFill::new(mask.as_slice(), mask.dims(), 0).run();
        debug!(
            "RegionLabeler::label dims={:?} regions={} elapsed_ms={:.3}",
            mask.dims(),
            regions.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Labeling {
            labels: LabelMap::from_raw(mask.dims(), labels),
            regions,
        }
    }

    /// Label 4-connected components of every z-plane independently.
    ///
    /// Numbering continues from one plane to the next in ascending z.
    pub fn label_slices(&self, mask: &BinaryMask) -> Labeling {
        let start = Instant::now();
        let per_plane = label_planes(mask);
        let mut labels = Vec::with_capacity(mask.len());
        let mut regions = Vec::new();
        for (plane_labels, plane_regions) in per_plane {
            let offset = regions.len() as u32;
            labels.extend(
                plane_labels
                    .into_iter()
                    .map(|l| if l == 0 { 0 } else { l + offset }),
            );
            regions.extend(plane_regions.into_iter().map(|mut r| {
                r.label += offset;
                r
            }));
        }
        debug!(
            "RegionLabeler::label_slices dims={:?} regions={} elapsed_ms={:.3}",
            mask.dims(),
            regions.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Labeling {
            labels: LabelMap::from_raw(mask.dims(), labels),
            regions,
        }
    }
}

type PlaneLabels = (Vec<u32>, Vec<Region>);

fn label_plane(mask: &BinaryMask, z: usize) -> PlaneLabels {
    FloodFill::new(mask.plane(z), [1, mask.rows(), mask.cols()], z).run()
}

#[cfg(feature = "parallel")]
fn label_planes(mask: &BinaryMask) -> Vec<PlaneLabels> {
    (0..mask.depth())
        .into_par_iter()
        .map(|z| label_plane(mask, z))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn label_planes(mask: &BinaryMask) -> Vec<PlaneLabels> {
    (0..mask.depth()).map(|z| label_plane(mask, z)).collect()
}

struct FloodFill<'a> {
    data: &'a [u8],
    dims: [usize; 3],
    z_offset: usize,
    labels: Vec<u32>,
    stack: Vec<usize>,
    region: RegionAccumulator,
    regions: Vec<Region>,
}

impl<'a> FloodFill<'a> {
    fn new(data: &'a [u8], dims: [usize; 3], z_offset: usize) -> Self {
        Self {
            data,
            dims,
            z_offset,
            labels: vec![0; data.len()],
            stack: Vec::new(),
            region: RegionAccumulator::new(),
            regions: Vec::new(),
        }
    }

    fn run(mut self) -> PlaneLabels {
        for idx in 0..self.data.len() {
            self.process_seed(idx);
        }
        (self.labels, self.regions)
    }

    fn process_seed(&mut self, idx: usize) {
        if self.data[idx] == 0 || self.labels[idx] != 0 {
            return;
        }
        let label = self.regions.len() as u32 + 1;
        self.region.reset();
        self.stack.clear();
        self.labels[idx] = label;
        self.stack.push(idx);
        self.grow_region(label);
        self.regions.push(self.region.to_region(label));
    }

    fn grow_region(&mut self, label: u32) {
        let [depth, rows, cols] = self.dims;
        let plane = rows * cols;
        while let Some(idx) = self.stack.pop() {
            let z = idx / plane;
            let rem = idx % plane;
            let y = rem / cols;
            let x = rem % cols;
            self.region.push(x, y, z + self.z_offset);

            if x > 0 {
                self.visit(idx - 1, label);
            }
            if x + 1 < cols {
                self.visit(idx + 1, label);
            }
            if y > 0 {
                self.visit(idx - cols, label);
            }
            if y + 1 < rows {
                self.visit(idx + cols, label);
            }
            if z > 0 {
                self.visit(idx - plane, label);
            }
            if z + 1 < depth {
                self.visit(idx + plane, label);
            }
        }
    }

    #[inline]
    fn visit(&mut self, idx: usize, label: u32) {
        if self.data[idx] != 0 && self.labels[idx] == 0 {
            self.labels[idx] = label;
            self.stack.push(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_planes(rows: usize, cols: usize, planes: &[&[u8]]) -> BinaryMask {
        let data: Vec<u8> = planes.iter().flat_map(|p| p.iter().copied()).collect();
        BinaryMask::from_raw([planes.len(), rows, cols], data).expect("valid mask")
    }

    fn two_squares() -> BinaryMask {
        let (rows, cols) = (12, 16);
        let mut mask = BinaryMask::zeros([1, rows, cols]).expect("valid dims");
        for y in 1..6 {
            for x in 1..6 {
                mask.set(0, y, x, true);
            }
        }
        for y in 5..10 {
            for x in 9..14 {
                mask.set(0, y, x, true);
            }
        }
        mask
    }

    #[test]
    fn two_squares_give_two_regions() {
        let labeling = RegionLabeler::default().label(&two_squares());
        assert_eq!(labeling.regions.len(), 2);
        let mut centroids: Vec<[f32; 3]> = labeling.regions.iter().map(|r| r.centroid).collect();
        centroids.sort_by(|a, b| a[0].total_cmp(&b[0]));
        assert_eq!(centroids, vec![[3.0, 3.0, 0.0], [11.0, 7.0, 0.0]]);
        for region in &labeling.regions {
            assert_eq!(region.area, 25);
            assert_eq!(region.bbox.size(), [5, 5, 1]);
            assert!((region.elongation() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn all_zero_mask_has_no_regions() {
        let mask = BinaryMask::zeros([3, 4, 4]).expect("valid dims");
        let labeling = RegionLabeler::default().label(&mask);
        assert!(labeling.regions.is_empty());
        assert!(labeling.labels.as_slice().iter().all(|&l| l == 0));
    }

    #[test]
    fn diagonal_neighbours_are_not_connected() {
        let mask = mask_from_planes(2, 2, &[&[1, 0, 0, 1]]);
        let labeling = RegionLabeler::default().label(&mask);
        assert_eq!(labeling.regions.len(), 2);
        assert_eq!(labeling.labels.get(0, 0, 0), 1);
        assert_eq!(labeling.labels.get(0, 1, 1), 2);
    }

    #[test]
    fn volumetric_links_across_planes_per_slice_does_not() {
        let mask = mask_from_planes(2, 2, &[&[1, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 1, 0]]);
        let volumetric = RegionLabeler::new(Connectivity::Volumetric).run(&mask);
        assert_eq!(volumetric.regions.len(), 2);
        assert_eq!(volumetric.regions[0].area, 4);
        assert_eq!(volumetric.regions[0].bbox.min, [0, 0, 0]);
        assert_eq!(volumetric.regions[0].bbox.max, [1, 0, 2]);

        let per_slice = RegionLabeler::new(Connectivity::PerSlice).run(&mask);
        let areas: Vec<usize> = per_slice.regions.iter().map(|r| r.area).collect();
        assert_eq!(areas, vec![2, 1, 1, 1]);
        let labels: Vec<u32> = per_slice.regions.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![1, 2, 3, 4]);
        assert_eq!(per_slice.labels.plane(2), &[0, 3, 4, 0]);
        assert_eq!(per_slice.regions[3].centroid, [0.0, 1.0, 2.0]);
    }

    #[test]
    fn labeling_is_stable_between_calls() {
        let mask = two_squares();
        let labeler = RegionLabeler::default();
        assert_eq!(labeler.label(&mask), labeler.label(&mask));
        assert_eq!(labeler.label_slices(&mask), labeler.label_slices(&mask));
    }

    #[test]
    fn region_lookup_by_label() {
        let labeling = RegionLabeler::default().label(&two_squares());
        assert_eq!(labeling.region(2).map(|r| r.label), Some(2));
        assert!(labeling.region(0).is_none());
        assert!(labeling.region(3).is_none());
    }
}
