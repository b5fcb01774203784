use slice_volume::segment::BinaryMask;
use slice_volume::SliceStack;

pub const INSIDE: u16 = 3000;
pub const OUTSIDE: u16 = 0;

/// Cubic stack of `n` slices holding a discretized sphere of `radius` voxels
/// centred in the volume. Voxels at distance `<= radius` are `INSIDE`.
pub fn sphere_stack(n: usize, radius: f32) -> SliceStack {
    assert!(n > 0, "volume size must be positive");
    let c = volume_center(n);
    let buffers = (0..n)
        .map(|z| {
            let mut data = vec![OUTSIDE; n * n];
            for y in 0..n {
                for x in 0..n {
                    if distance([x as f32, y as f32, z as f32], [c, c, c]) <= radius {
                        data[y * n + x] = INSIDE;
                    }
                }
            }
            data
        })
        .collect();
    SliceStack::from_buffers(n, n, buffers)
}

/// Index-space centre of an axis with `n` samples.
pub fn volume_center(n: usize) -> f32 {
    (n as f32 - 1.0) / 2.0
}

pub fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

/// Single-plane mask with two disjoint 5x5 squares whose top-left corners
/// are `(1, 1)` and `(10, 6)`.
pub fn two_squares_mask() -> BinaryMask {
    let mut mask = BinaryMask::zeros([1, 14, 18]).expect("valid dims");
    for (x0, y0) in [(1usize, 1usize), (10, 6)] {
        for y in y0..y0 + 5 {
            for x in x0..x0 + 5 {
                mask.set(0, y, x, true);
            }
        }
    }
    mask
}

/// Stack with bright axis-aligned boxes `(min, max)` inclusive, `[x, y, z]`.
pub fn boxes_stack(dims: [usize; 3], boxes: &[([usize; 3], [usize; 3])]) -> SliceStack {
    let [depth, rows, cols] = dims;
    let buffers = (0..depth)
        .map(|z| {
            let mut data = vec![OUTSIDE; rows * cols];
            for (min, max) in boxes {
                if z < min[2] || z > max[2] {
                    continue;
                }
                for y in min[1]..=max[1] {
                    for x in min[0]..=max[0] {
                        data[y * cols + x] = INSIDE;
                    }
                }
            }
            data
        })
        .collect();
    SliceStack::from_buffers(rows, cols, buffers)
}
