use crate::error::VolumeError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_AREA: usize = 100;
pub const DEFAULT_TAG: &str = "anomaly";

/// Tags attached to markers per classification outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyTags {
    pub candidate: String,
    pub oversized: String,
    /// Bounding box longer than `max_extent` along some axis.
    pub extent: String,
    pub elongated: String,
    pub out_of_zone: String,
}

impl Default for AnomalyTags {
    fn default() -> Self {
        Self {
            candidate: DEFAULT_TAG.to_string(),
            oversized: "oversized".to_string(),
            extent: "extent".to_string(),
            elongated: "elongated".to_string(),
            out_of_zone: "out_of_zone".to_string(),
        }
    }
}

impl AnomalyTags {
    fn validate(&self) -> Result<(), VolumeError> {
        let named = [
            ("candidate", &self.candidate),
            ("oversized", &self.oversized),
            ("extent", &self.extent),
            ("elongated", &self.elongated),
            ("out_of_zone", &self.out_of_zone),
        ];
        for (field, tag) in named {
            if tag.trim().is_empty() {
                return Err(VolumeError::invalid(format!("tag `{field}` is empty")));
            }
        }
        Ok(())
    }
}

/// Named axis-aligned box in index space where regions are expected.
///
/// Bounds are inclusive and ordered `[x, y, z]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpectedZone {
    pub name: String,
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl ExpectedZone {
    pub fn contains(&self, p: [f32; 3]) -> bool {
        (0..3).all(|k| p[k] >= self.min[k] && p[k] <= self.max[k])
    }
}

/// Size, shape and placement rules applied to labelled regions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyPolicy {
    /// Regions with `area <= min_area` are treated as noise.
    pub min_area: usize,
    /// Regions larger than this are tagged oversized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_area: Option<usize>,
    /// Per-axis bounding-box limit `[x, y, z]` in voxels; a longer box is
    /// tagged with `tags.extent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_extent: Option<[usize; 3]>,
    /// Regions whose principal spread ratio exceeds this are tagged elongated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_elongation: Option<f32>,
    /// Number of regions expected to survive the area filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_count: Option<usize>,
    pub zones: Vec<ExpectedZone>,
    /// Emit a marker for every surviving region that no other rule caught.
    pub flag_candidates: bool,
    pub tags: AnomalyTags,
}

impl Default for AnomalyPolicy {
    fn default() -> Self {
        Self {
            min_area: DEFAULT_MIN_AREA,
            max_area: None,
            max_extent: None,
            max_elongation: None,
            expected_count: None,
            zones: Vec::new(),
            flag_candidates: true,
            tags: AnomalyTags::default(),
        }
    }
}

impl AnomalyPolicy {
    pub fn validate(&self) -> Result<(), VolumeError> {
        if let Some(max_area) = self.max_area {
            if max_area < self.min_area {
                return Err(VolumeError::invalid(format!(
                    "max_area {max_area} is below min_area {}",
                    self.min_area
                )));
            }
        }
        if let Some(extent) = self.max_extent {
            if extent.contains(&0) {
                return Err(VolumeError::invalid(format!(
                    "max_extent components must be positive, got {extent:?}"
                )));
            }
        }
        if let Some(limit) = self.max_elongation {
            if !limit.is_finite() || limit < 1.0 {
                return Err(VolumeError::invalid(format!(
                    "max_elongation must be a finite value >= 1, got {limit}"
                )));
            }
        }
        for zone in &self.zones {
            let finite = zone.min.iter().chain(zone.max.iter()).all(|v| v.is_finite());
            if !finite || (0..3).any(|k| zone.min[k] > zone.max[k]) {
                return Err(VolumeError::invalid(format!(
                    "zone `{}` has invalid bounds {:?}..{:?}",
                    zone.name, zone.min, zone.max
                )));
            }
        }
        self.tags.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = AnomalyPolicy::default();
        assert_eq!(policy.min_area, 100);
        assert_eq!(policy.tags.candidate, "anomaly");
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_area_bounds() {
        let policy = AnomalyPolicy {
            min_area: 50,
            max_area: Some(10),
            ..AnomalyPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(VolumeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_zero_extent_axis() {
        let policy = AnomalyPolicy {
            max_extent: Some([5, 0, 5]),
            ..AnomalyPolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(VolumeError::InvalidConfiguration(_))
        ));
        let policy = AnomalyPolicy {
            max_extent: Some([5, 5, 5]),
            ..AnomalyPolicy::default()
        };
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn rejects_empty_tag_and_bad_zone() {
        let mut policy = AnomalyPolicy::default();
        policy.tags.oversized = "  ".to_string();
        assert!(policy.validate().is_err());

        let policy = AnomalyPolicy {
            zones: vec![ExpectedZone {
                name: "upper".to_string(),
                min: [5.0, 0.0, 0.0],
                max: [1.0, 4.0, 4.0],
            }],
            ..AnomalyPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let policy: AnomalyPolicy =
            serde_json::from_str(r#"{ "max_area": 400, "tags": { "oversized": "large" } }"#)
                .expect("parse policy");
        assert_eq!(policy.min_area, 100);
        assert_eq!(policy.max_area, Some(400));
        assert_eq!(policy.tags.oversized, "large");
        assert_eq!(policy.tags.candidate, "anomaly");
        assert_eq!(policy.tags.extent, "extent");
        assert_eq!(policy.max_extent, None);
        assert!(policy.flag_candidates);
    }
}
