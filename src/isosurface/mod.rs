//! Isosurface extraction with marching cubes.
//!
//! Overview
//! - The volume is partitioned into cells whose 8 corners are adjacent
//!   voxels. Each corner is compared against the isovalue (`v < iso` sets the
//!   corner bit) to form an 8-bit configuration.
//! - `EDGE_TABLE` names the cell edges crossed by the level set; each crossing
//!   is placed by linear interpolation `t = (iso - v0) / (v1 - v0)` clamped to
//!   `[0, 1]`. Edges with `v0 == v1` never cross.
//! - `TRI_TABLE` triangulates the crossings. Cells fully above or below the
//!   isovalue emit nothing; the outer boundary is not wrapped.
//! - Cells are processed one z-layer at a time. Layers are independent (and
//!   run on rayon with the `parallel` feature), then stitched in z order so
//!   shared edges map to one vertex and the result is deterministic.
//!
//! A binary mask is meshed the same way through `extract_mask`, sampling set
//! voxels as 1.0 and marching at `MASK_ISOVALUE`.
//!
//! Around a bright object the triangles are wound counter-clockwise when seen
//! from outside.

mod export;
mod extractor;
mod mesh;
mod tables;

pub use export::{save_mesh, write_obj, write_ply_ascii, MeshFormat};
pub use extractor::{extract_isosurface, IsosurfaceExtractor, IsosurfaceOptions, MASK_ISOVALUE};
pub use mesh::Mesh;
