//! I/O helpers for slice images, masks and JSON.
//!
//! - `load_grayscale_u16`: read a PNG into an owned 16-bit gray buffer.
//! - `save_preview_u16`: min-max stretch a 16-bit image into an 8-bit PNG.
//! - `save_orthogonal_previews`: middle axial, coronal and sagittal previews.
//! - `save_mask_png`: write one plane of a binary mask as black/white PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{GrayImageU16, ImageView};
use crate::segment::BinaryMask;
use crate::volume::Volume;
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Load an image from disk and convert to 16-bit grayscale.
pub fn load_grayscale_u16(path: &Path) -> Result<GrayImageU16, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma16();
    let w = img.width() as usize;
    let h = img.height() as usize;
    Ok(GrayImageU16 {
        w,
        h,
        data: img.into_raw(),
    })
}

/// Linearly map `[min, max]` of the image onto `[0, 255]`.
///
/// A constant image maps to all zeros.
pub fn normalize_to_u8<I: ImageView<Pixel = u16>>(image: &I) -> Vec<u8> {
    let mut lo = u16::MAX;
    let mut hi = u16::MIN;
    for row in image.rows() {
        for &v in row {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    let span = hi.saturating_sub(lo) as f32;
    let mut out = Vec::with_capacity(image.width() * image.height());
    for row in image.rows() {
        for &v in row {
            let scaled = if span > 0.0 {
                ((v - lo) as f32 / span * 255.0).round()
            } else {
                0.0
            };
            out.push(scaled.clamp(0.0, 255.0) as u8);
        }
    }
    out
}

/// Save a 16-bit image as an 8-bit preview PNG using a min-max stretch.
pub fn save_preview_u16<I: ImageView<Pixel = u16>>(image: &I, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let bytes = normalize_to_u8(image);
    let out = GrayImage::from_raw(image.width() as u32, image.height() as u32, bytes)
        .ok_or_else(|| "Failed to create image buffer".to_string())?;
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Save plane `z` of a binary mask (set elements white).
/// Write 8-bit previews of the middle axial slice, coronal row and sagittal
/// column of `volume` into `dir`. Returns the written paths in that order.
pub fn save_orthogonal_previews(volume: &Volume, dir: &Path) -> Result<Vec<PathBuf>, String> {
    if volume.is_empty() {
        return Err("Cannot preview an empty volume".to_string());
    }
    let (z, row, col) = (volume.depth() / 2, volume.rows() / 2, volume.cols() / 2);
    let coronal = volume.coronal(row).map_err(|e| e.to_string())?;
    let sagittal = volume.sagittal(col).map_err(|e| e.to_string())?;

    let axial_path = dir.join(format!("axial_{z:04}.png"));
    save_preview_u16(&volume.slice(z), &axial_path)?;
    let coronal_path = dir.join(format!("coronal_{row:04}.png"));
    save_preview_u16(&coronal, &coronal_path)?;
    let sagittal_path = dir.join(format!("sagittal_{col:04}.png"));
    save_preview_u16(&sagittal, &sagittal_path)?;
    Ok(vec![axial_path, coronal_path, sagittal_path])
}

pub fn save_mask_png(mask: &BinaryMask, z: usize, path: &Path) -> Result<(), String> {
    if z >= mask.depth() {
        return Err(format!(
            "Mask plane {z} out of range (depth {})",
            mask.depth()
        ));
    }
    ensure_parent_dir(path)?;
    let plane = mask.plane(z);
    let mut out = GrayImage::new(mask.cols() as u32, mask.rows() as u32);
    for (i, &v) in plane.iter().enumerate() {
        let x = (i % mask.cols()) as u32;
        let y = (i / mask.cols()) as u32;
        out.put_pixel(x, y, Luma([if v != 0 { 255 } else { 0 }]));
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
