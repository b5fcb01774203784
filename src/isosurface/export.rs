//! Mesh interchange writers.
//!
//! - Wavefront OBJ (`v x y z` / `f a b c`, 1-based indices).
//! - ASCII PLY with `vertex` (float x,y,z) and `face` (uchar count, uint indices).
//!
//! Writers take any `std::io::Write`; `save_mesh` picks the format from the
//! path extension.
use super::mesh::Mesh;
use crate::image::io::ensure_parent_dir;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Supported mesh file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    PlyAscii,
}

impl MeshFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "obj" => Some(MeshFormat::Obj),
            "ply" => Some(MeshFormat::PlyAscii),
            _ => None,
        }
    }
}

pub fn write_obj<W: Write>(mesh: &Mesh, mut out: W) -> io::Result<()> {
    writeln!(
        out,
        "# {} vertices, {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    )?;
    for v in &mesh.vertices {
        writeln!(out, "v {} {} {}", v[0], v[1], v[2])?;
    }
    for f in &mesh.faces {
        writeln!(out, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    out.flush()
}

pub fn write_ply_ascii<W: Write>(mesh: &Mesh, mut out: W) -> io::Result<()> {
    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {}", mesh.vertex_count())?;
    writeln!(out, "property float x")?;
    writeln!(out, "property float y")?;
    writeln!(out, "property float z")?;
    writeln!(out, "element face {}", mesh.face_count())?;
    writeln!(out, "property list uchar uint vertex_indices")?;
    writeln!(out, "end_header")?;
    for v in &mesh.vertices {
        writeln!(out, "{} {} {}", v[0], v[1], v[2])?;
    }
    for f in &mesh.faces {
        writeln!(out, "3 {} {} {}", f[0], f[1], f[2])?;
    }
    out.flush()
}

/// Write `mesh` to `path` as OBJ or PLY depending on the extension.
pub fn save_mesh(mesh: &Mesh, path: &Path) -> Result<(), String> {
    let format = MeshFormat::from_path(path).ok_or_else(|| {
        format!(
            "Unsupported mesh extension for {} (expected .obj or .ply)",
            path.display()
        )
    })?;
    ensure_parent_dir(path)?;
    let file =
        File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    let writer = BufWriter::new(file);
    match format {
        MeshFormat::Obj => write_obj(mesh, writer),
        MeshFormat::PlyAscii => write_ply_ascii(mesh, writer),
    }
    .map_err(|e| format!("Failed to write mesh {}: {e}", path.display()))
}
