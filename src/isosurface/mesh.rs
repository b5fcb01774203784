use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Indexed triangle mesh: vertex positions plus index triples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Index of the first face referencing a missing vertex, if any.
    pub fn first_invalid_face(&self) -> Option<usize> {
        let n = self.vertices.len();
        self.faces
            .iter()
            .position(|f| f.iter().any(|&i| i as usize >= n))
    }

    pub fn is_valid(&self) -> bool {
        self.first_invalid_face().is_none()
    }

    /// Axis-aligned bounds `(min, max)` of the vertex set.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        let mut lo = first;
        let mut hi = first;
        for v in &self.vertices[1..] {
            for k in 0..3 {
                lo[k] = lo[k].min(v[k]);
                hi[k] = hi[k].max(v[k]);
            }
        }
        Some((lo, hi))
    }

    /// Sum of triangle areas. Faces with out-of-range indices are skipped.
    pub fn surface_area(&self) -> f64 {
        let vertex = |i: u32| {
            self.vertices
                .get(i as usize)
                .map(|p| Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64))
        };
        self.faces
            .iter()
            .filter_map(|f| {
                let (a, b, c) = (vertex(f[0])?, vertex(f[1])?, vertex(f[2])?);
                Some(0.5 * (b - a).cross(&(c - a)).norm())
            })
            .sum()
    }
}
