use crate::anomaly::{AnomalyPolicy, AnomalyTags, ExpectedZone};
use crate::error::VolumeError;
use crate::isosurface::IsosurfaceOptions;
use crate::pipeline::{MarkerCommand, PipelineParams};
use crate::regions::Connectivity;
use crate::segment::{ThresholdDirection, ThresholdOptions};
use crate::volume::AssemblerOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of the `slice_pipeline` tool.
#[derive(Debug, Deserialize)]
pub struct SlicePipelineConfig {
    /// Base directory for relative input paths.
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    pub inputs: Vec<SliceInput>,
    #[serde(default)]
    pub spacing: Option<[f32; 3]>,
    #[serde(default)]
    pub isosurface: IsosurfaceConfig,
    #[serde(default)]
    pub segmentation: Option<SegmentationConfig>,
    #[serde(default)]
    pub connectivity: Connectivity,
    #[serde(default)]
    pub anomaly: AnomalyConfig,
    /// Manual marker edits applied before detection.
    #[serde(default)]
    pub commands: Vec<MarkerCommand>,
    pub output: OutputConfig,
}

/// One slice image; the ordinal defaults to the list position.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SliceInput {
    Path(PathBuf),
    Indexed { path: PathBuf, index: usize },
}

impl SliceInput {
    pub fn path(&self) -> &Path {
        match self {
            SliceInput::Path(path) | SliceInput::Indexed { path, .. } => path,
        }
    }

    pub fn index_or(&self, position: usize) -> usize {
        match self {
            SliceInput::Path(_) => position,
            SliceInput::Indexed { index, .. } => *index,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IsosurfaceConfig {
    pub enabled: Option<bool>,
    /// Mesh the segmented mask boundary as well.
    pub mask_surface: Option<bool>,
    pub isovalue: Option<f32>,
    pub deduplicate_vertices: Option<bool>,
}

impl IsosurfaceConfig {
    pub fn resolve(&self) -> Result<IsosurfaceOptions, VolumeError> {
        let mut options = IsosurfaceOptions::default();
        if let Some(v) = self.isovalue {
            if !v.is_finite() {
                return Err(VolumeError::invalid(format!("isovalue must be finite, got {v}")));
            }
            options.isovalue = v;
        }
        if let Some(v) = self.deduplicate_vertices {
            options.deduplicate_vertices = v;
        }
        Ok(options)
    }
}

/// Threshold section; when present the direction must be given.
#[derive(Debug, Deserialize)]
pub struct SegmentationConfig {
    #[serde(default)]
    pub threshold: Option<f32>,
    #[serde(default)]
    pub direction: Option<ThresholdDirection>,
}

impl SegmentationConfig {
    pub fn resolve(&self) -> Result<ThresholdOptions, VolumeError> {
        let direction = self
            .direction
            .ok_or_else(|| VolumeError::invalid("segmentation direction must be ABOVE or BELOW"))?;
        let threshold = self
            .threshold
            .unwrap_or(ThresholdOptions::default().threshold);
        if !threshold.is_finite() {
            return Err(VolumeError::invalid(format!(
                "segmentation threshold must be finite, got {threshold}"
            )));
        }
        Ok(ThresholdOptions {
            threshold,
            direction,
        })
    }
}

/// Anomaly section. Areas are signed here so negative values can be reported.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub min_area: Option<i64>,
    pub max_area: Option<i64>,
    /// Per-axis bounding-box limit `[x, y, z]` in voxels.
    pub max_extent: Option<[i64; 3]>,
    pub max_elongation: Option<f32>,
    pub expected_count: Option<i64>,
    pub zones: Vec<ExpectedZone>,
    pub flag_candidates: Option<bool>,
    /// Shorthand for `tags.candidate`.
    pub tag: Option<String>,
    pub tags: Option<AnomalyTags>,
}

impl AnomalyConfig {
    pub fn resolve(&self) -> Result<AnomalyPolicy, VolumeError> {
        let mut policy = AnomalyPolicy::default();
        if let Some(v) = self.min_area {
            policy.min_area = non_negative("min_area", v)?;
        }
        if let Some(v) = self.max_area {
            policy.max_area = Some(non_negative("max_area", v)?);
        }
        if let Some([x, y, z]) = self.max_extent {
            policy.max_extent = Some([
                non_negative("max_extent[0]", x)?,
                non_negative("max_extent[1]", y)?,
                non_negative("max_extent[2]", z)?,
            ]);
        }
        if let Some(v) = self.expected_count {
            policy.expected_count = Some(non_negative("expected_count", v)?);
        }
        policy.max_elongation = self.max_elongation;
        policy.zones = self.zones.clone();
        if let Some(v) = self.flag_candidates {
            policy.flag_candidates = v;
        }
        if let Some(tags) = &self.tags {
            policy.tags = tags.clone();
        }
        if let Some(tag) = &self.tag {
            policy.tags.candidate = tag.clone();
        }
        policy.validate()?;
        Ok(policy)
    }
}

fn non_negative(field: &str, value: i64) -> Result<usize, VolumeError> {
    usize::try_from(value)
        .map_err(|_| VolumeError::invalid(format!("{field} must be non-negative, got {value}")))
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// `.obj` or `.ply`; omitted means no mesh file.
    #[serde(default)]
    pub mesh: Option<PathBuf>,
    /// Mask boundary mesh, `.obj` or `.ply`.
    #[serde(default)]
    pub mask_mesh: Option<PathBuf>,
    #[serde(default)]
    pub markers_json: Option<PathBuf>,
    #[serde(default)]
    pub report_json: Option<PathBuf>,
    /// Directory for per-slice mask PNGs.
    #[serde(default)]
    pub mask_dir: Option<PathBuf>,
    /// Directory for 8-bit axial / coronal / sagittal previews.
    #[serde(default)]
    pub preview_dir: Option<PathBuf>,
}

impl OutputConfig {
    pub fn mesh_path(&self) -> Option<PathBuf> {
        self.mesh.as_deref().map(|p| resolve_path(&self.dir, p))
    }

    pub fn mask_mesh_path(&self) -> Option<PathBuf> {
        self.mask_mesh.as_deref().map(|p| resolve_path(&self.dir, p))
    }

    pub fn markers_path(&self) -> Option<PathBuf> {
        self.markers_json.as_deref().map(|p| resolve_path(&self.dir, p))
    }

    pub fn report_path(&self) -> Option<PathBuf> {
        self.report_json.as_deref().map(|p| resolve_path(&self.dir, p))
    }

    pub fn mask_dir(&self) -> Option<PathBuf> {
        self.mask_dir.as_deref().map(|p| resolve_path(&self.dir, p))
    }

    pub fn preview_dir(&self) -> Option<PathBuf> {
        self.preview_dir.as_deref().map(|p| resolve_path(&self.dir, p))
    }
}

impl SlicePipelineConfig {
    /// Validated pipeline parameters.
    pub fn resolve(&self) -> Result<PipelineParams, VolumeError> {
        let assembler = match self.spacing {
            Some(spacing) => {
                crate::volume::validate_spacing(spacing)?;
                AssemblerOptions { spacing }
            }
            None => AssemblerOptions::default(),
        };
        let segmentation = match &self.segmentation {
            Some(section) => section.resolve()?,
            None => ThresholdOptions::default(),
        };
        Ok(PipelineParams {
            assembler,
            isosurface: self.isosurface.resolve()?,
            extract_surface: self.isosurface.enabled.unwrap_or(true),
            extract_mask_surface: self.isosurface.mask_surface.unwrap_or(true),
            segmentation,
            connectivity: self.connectivity,
            anomaly: self.anomaly.resolve()?,
        })
    }

    /// Input paths with ordinals, relative paths joined onto `input_dir`.
    pub fn slice_paths(&self) -> Vec<(usize, PathBuf)> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(position, input)| {
                let path = match &self.input_dir {
                    Some(dir) => resolve_path(dir, input.path()),
                    None => input.path().to_path_buf(),
                };
                (input.index_or(position), path)
            })
            .collect()
    }
}

pub fn load_config(path: &Path) -> Result<SlicePipelineConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&data).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

pub fn parse_config(json: &str) -> Result<SlicePipelineConfig, serde_json::Error> {
    serde_json::from_str(json)
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
