use super::types::{BoundingBox, Region};
use nalgebra::{Matrix3, SymmetricEigen};

/// Variance of a unit-width uniform distribution, so a single voxel has extent.
const VOXEL_VARIANCE: f64 = 1.0 / 12.0;

/// Running moments of the voxels grown into the current region.
pub(crate) struct RegionAccumulator {
    count: usize,
    sum: [f64; 3],
    // xx, yy, zz, xy, xz, yz
    sum_sq: [f64; 6],
    min: [usize; 3],
    max: [usize; 3],
}

impl RegionAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            count: 0,
            sum: [0.0; 3],
            sum_sq: [0.0; 6],
            min: [usize::MAX; 3],
            max: [0; 3],
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn push(&mut self, x: usize, y: usize, z: usize) {
        self.count += 1;
        let p = [x, y, z];
        let (xf, yf, zf) = (x as f64, y as f64, z as f64);
        self.sum[0] += xf;
        self.sum[1] += yf;
        self.sum[2] += zf;
        self.sum_sq[0] += xf * xf;
        self.sum_sq[1] += yf * yf;
        self.sum_sq[2] += zf * zf;
        self.sum_sq[3] += xf * yf;
        self.sum_sq[4] += xf * zf;
        self.sum_sq[5] += yf * zf;
        for k in 0..3 {
            self.min[k] = self.min[k].min(p[k]);
            self.max[k] = self.max[k].max(p[k]);
        }
    }

    fn mean(&self) -> [f64; 3] {
        let n = self.count.max(1) as f64;
        [self.sum[0] / n, self.sum[1] / n, self.sum[2] / n]
    }

    fn covariance(&self) -> Matrix3<f64> {
        let n = self.count.max(1) as f64;
        let m = self.mean();
        let cxx = self.sum_sq[0] / n - m[0] * m[0];
        let cyy = self.sum_sq[1] / n - m[1] * m[1];
        let czz = self.sum_sq[2] / n - m[2] * m[2];
        let cxy = self.sum_sq[3] / n - m[0] * m[1];
        let cxz = self.sum_sq[4] / n - m[0] * m[2];
        let cyz = self.sum_sq[5] / n - m[1] * m[2];
        Matrix3::new(cxx, cxy, cxz, cxy, cyy, cyz, cxz, cyz, czz)
    }

    /// Standard deviations along the principal axes, largest first.
    fn spread(&self) -> [f32; 3] {
        let cov = self.covariance() + Matrix3::identity() * VOXEL_VARIANCE;
        let eig = SymmetricEigen::new(cov);
        let mut values = [
            eig.eigenvalues[0],
            eig.eigenvalues[1],
            eig.eigenvalues[2],
        ];
        values.sort_by(|a, b| b.total_cmp(a));
        values.map(|v| v.max(0.0).sqrt() as f32)
    }

    pub(crate) fn to_region(&self, label: u32) -> Region {
        let m = self.mean();
        Region {
            label,
            area: self.count,
            centroid: [m[0] as f32, m[1] as f32, m[2] as f32],
            bbox: BoundingBox {
                min: self.min,
                max: self.max,
            },
            spread: self.spread(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_of_voxels_is_elongated() {
        let mut acc = RegionAccumulator::new();
        for x in 0..9 {
            acc.push(x, 4, 0);
        }
        let region = acc.to_region(1);
        assert_eq!(region.area, 9);
        assert_eq!(region.centroid, [4.0, 4.0, 0.0]);
        assert_eq!(region.bbox.min, [0, 4, 0]);
        assert_eq!(region.bbox.max, [8, 4, 0]);
        // variance of x over 0..9 is 20/3, plus 1/12 => sqrt(6.75) = 2.598
        assert!((region.spread[0] - 6.75f32.sqrt()).abs() < 1e-4);
        assert!((region.elongation() - 9.0).abs() < 1e-3);
    }

    #[test]
    fn reset_clears_moments() {
        let mut acc = RegionAccumulator::new();
        acc.push(3, 3, 3);
        acc.reset();
        acc.push(1, 2, 3);
        let region = acc.to_region(7);
        assert_eq!(region.area, 1);
        assert_eq!(region.centroid, [1.0, 2.0, 3.0]);
        assert!((region.elongation() - 1.0).abs() < 1e-5);
    }
}
