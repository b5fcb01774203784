use super::marker::{Marker, MarkerSource};
use super::policy::AnomalyPolicy;
use crate::error::VolumeError;
use crate::regions::Region;
use crate::volume::{self, UNIT_SPACING};
use log::{debug, info};
use serde::Serialize;

/// Outcome of one detection pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    /// One marker per flagged region, in region order.
    pub markers: Vec<Marker>,
    pub flagged_labels: Vec<u32>,
    /// Regions that passed the minimum-area filter.
    pub considered: usize,
    /// `considered - expected_count` when the two differ.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_mismatch: Option<i64>,
    /// Zones that contain no considered region centroid.
    pub empty_zones: Vec<String>,
}

/// Applies an `AnomalyPolicy` to labelled regions.
#[derive(Clone, Debug)]
pub struct AnomalyDetector {
    policy: AnomalyPolicy,
    spacing: [f32; 3],
}

impl AnomalyDetector {
    pub fn new(policy: AnomalyPolicy) -> Result<Self, VolumeError> {
        policy.validate()?;
        Ok(Self {
            policy,
            spacing: UNIT_SPACING,
        })
    }

    /// Scale marker positions by the volume spacing `[sx, sy, sz]`.
    pub fn with_spacing(mut self, spacing: [f32; 3]) -> Result<Self, VolumeError> {
        volume::validate_spacing(spacing)?;
        self.spacing = spacing;
        Ok(self)
    }

    pub fn policy(&self) -> &AnomalyPolicy {
        &self.policy
    }

    pub fn spacing(&self) -> [f32; 3] {
        self.spacing
    }

    /// Tag for a region, or `None` when it is noise or unremarkable.
    ///
    /// Rules are checked in order: oversized, over the per-axis extent,
    /// elongated, outside every zone, then the plain candidate tag.
    pub fn classify(&self, region: &Region) -> Option<&str> {
        let policy = &self.policy;
        if region.area <= policy.min_area {
            return None;
        }
        if policy.max_area.is_some_and(|max| region.area > max) {
            return Some(policy.tags.oversized.as_str());
        }
        if let Some(limit) = policy.max_extent {
            let size = region.bbox.size();
            if (0..3).any(|k| size[k] > limit[k]) {
                return Some(policy.tags.extent.as_str());
            }
        }
        if policy
            .max_elongation
            .is_some_and(|max| region.elongation() > max)
        {
            return Some(policy.tags.elongated.as_str());
        }
        if !policy.zones.is_empty() && !policy.zones.iter().any(|z| z.contains(region.centroid)) {
            return Some(policy.tags.out_of_zone.as_str());
        }
        if policy.flag_candidates {
            return Some(policy.tags.candidate.as_str());
        }
        None
    }

    pub fn detect(&self, regions: &[Region]) -> AnomalyReport {
        let mut report = AnomalyReport::default();
        let mut zone_hits = vec![false; self.policy.zones.len()];
        for region in regions {
            if region.area <= self.policy.min_area {
                continue;
            }
            report.considered += 1;
            for (hit, zone) in zone_hits.iter_mut().zip(&self.policy.zones) {
                *hit |= zone.contains(region.centroid);
            }
            if let Some(tag) = self.classify(region) {
                report.markers.push(self.marker_for(region, tag));
                report.flagged_labels.push(region.label);
            }
        }
        if let Some(expected) = self.policy.expected_count {
            let diff = report.considered as i64 - expected as i64;
            if diff != 0 {
                info!(
                    "AnomalyDetector::detect count mismatch considered={} expected={expected}",
                    report.considered
                );
                report.count_mismatch = Some(diff);
            }
        }
        report.empty_zones = self
            .policy
            .zones
            .iter()
            .zip(&zone_hits)
            .filter(|(_, hit)| !**hit)
            .map(|(zone, _)| zone.name.clone())
            .collect();
        debug!(
            "AnomalyDetector::detect regions={} considered={} markers={} empty_zones={}",
            regions.len(),
            report.considered,
            report.markers.len(),
            report.empty_zones.len()
        );
        report
    }

    fn marker_for(&self, region: &Region, tag: &str) -> Marker {
        let c = region.centroid;
        let s = self.spacing;
        Marker {
            position: [c[0] * s[0], c[1] * s[1], c[2] * s[2]],
            slice: c[2].round().max(0.0) as usize,
            tag: tag.to_string(),
            source: MarkerSource::Detected,
            label: Some(region.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::ExpectedZone;
    use crate::regions::BoundingBox;

    fn region(label: u32, area: usize, centroid: [f32; 3], spread: [f32; 3]) -> Region {
        let c = centroid.map(|v| v.round() as usize);
        Region {
            label,
            area,
            centroid,
            bbox: BoundingBox { min: c, max: c },
            spread,
        }
    }

    fn round(label: u32, area: usize, centroid: [f32; 3]) -> Region {
        region(label, area, centroid, [3.0, 3.0, 1.0])
    }

    #[test]
    fn no_regions_no_markers() {
        let policies = [
            AnomalyPolicy::default(),
            AnomalyPolicy {
                min_area: 0,
                expected_count: Some(0),
                ..AnomalyPolicy::default()
            },
        ];
        for policy in policies {
            let report = AnomalyDetector::new(policy).expect("valid").detect(&[]);
            assert!(report.markers.is_empty());
            assert_eq!(report.considered, 0);
            assert_eq!(report.count_mismatch, None);
        }
    }

    #[test]
    fn min_area_is_exclusive() {
        let detector = AnomalyDetector::new(AnomalyPolicy::default()).expect("valid");
        let report = detector.detect(&[round(1, 100, [1.0, 1.0, 0.0]), round(2, 101, [5.0, 5.0, 0.0])]);
        assert_eq!(report.considered, 1);
        assert_eq!(report.flagged_labels, vec![2]);
        assert_eq!(report.markers[0].tag, "anomaly");
        assert_eq!(report.markers[0].source, MarkerSource::Detected);
    }

    #[test]
    fn markers_are_scaled_and_assigned_to_nearest_slice() {
        let policy = AnomalyPolicy {
            min_area: 10,
            ..AnomalyPolicy::default()
        };
        let detector = AnomalyDetector::new(policy)
            .and_then(|d| d.with_spacing([0.5, 0.5, 2.0]))
            .expect("valid");
        let report = detector.detect(&[round(4, 25, [3.0, 6.0, 2.6])]);
        let marker = &report.markers[0];
        assert_eq!(marker.position, [1.5, 3.0, 5.2]);
        assert_eq!(marker.slice, 3);
        assert_eq!(marker.label, Some(4));
    }

    #[test]
    fn first_matching_rule_wins() {
        let policy = AnomalyPolicy {
            min_area: 10,
            max_area: Some(500),
            max_elongation: Some(3.0),
            zones: vec![ExpectedZone {
                name: "left".to_string(),
                min: [0.0, 0.0, 0.0],
                max: [10.0, 10.0, 10.0],
            }],
            ..AnomalyPolicy::default()
        };
        let detector = AnomalyDetector::new(policy).expect("valid");
        let regions = [
            region(1, 900, [2.0, 2.0, 0.0], [20.0, 1.0, 1.0]),
            region(2, 50, [2.0, 2.0, 0.0], [8.0, 2.0, 1.0]),
            round(3, 50, [40.0, 2.0, 0.0]),
            round(4, 50, [4.0, 4.0, 1.0]),
        ];
        let tags: Vec<String> = detector
            .detect(&regions)
            .markers
            .into_iter()
            .map(|m| m.tag)
            .collect();
        assert_eq!(tags, vec!["oversized", "elongated", "out_of_zone", "anomaly"]);
    }

    #[test]
    fn long_bounding_box_exceeds_extent() {
        let policy = AnomalyPolicy {
            min_area: 10,
            max_extent: Some([5, 5, 5]),
            ..AnomalyPolicy::default()
        };
        let detector = AnomalyDetector::new(policy).expect("valid");
        let mut bar = round(1, 30, [4.0, 2.0, 0.0]);
        bar.bbox = BoundingBox {
            min: [0, 2, 0],
            max: [9, 4, 0],
        };
        let mut block = round(2, 27, [2.0, 2.0, 1.0]);
        block.bbox = BoundingBox {
            min: [1, 1, 0],
            max: [5, 3, 2],
        };
        assert_eq!(detector.classify(&bar), Some("extent"));
        // exactly 5 voxels wide stays within the limit
        assert_eq!(detector.classify(&block), Some("anomaly"));
    }

    #[test]
    fn area_rule_precedes_extent_rule() {
        let policy = AnomalyPolicy {
            min_area: 10,
            max_area: Some(20),
            max_extent: Some([2, 2, 2]),
            ..AnomalyPolicy::default()
        };
        let detector = AnomalyDetector::new(policy).expect("valid");
        let mut big = round(1, 64, [2.0, 2.0, 2.0]);
        big.bbox = BoundingBox {
            min: [0, 0, 0],
            max: [3, 3, 3],
        };
        assert_eq!(detector.classify(&big), Some("oversized"));
    }

    #[test]
    fn reports_count_mismatch_and_empty_zones() {
        let policy = AnomalyPolicy {
            min_area: 10,
            expected_count: Some(3),
            flag_candidates: false,
            zones: vec![
                ExpectedZone {
                    name: "upper".to_string(),
                    min: [0.0, 0.0, 0.0],
                    max: [20.0, 9.0, 5.0],
                },
                ExpectedZone {
                    name: "lower".to_string(),
                    min: [0.0, 10.0, 0.0],
                    max: [20.0, 20.0, 5.0],
                },
            ],
            ..AnomalyPolicy::default()
        };
        let detector = AnomalyDetector::new(policy).expect("valid");
        let report = detector.detect(&[round(1, 40, [5.0, 3.0, 1.0]), round(2, 5, [5.0, 15.0, 1.0])]);
        assert_eq!(report.considered, 1);
        assert_eq!(report.count_mismatch, Some(-2));
        assert_eq!(report.empty_zones, vec!["lower".to_string()]);
        assert!(report.markers.is_empty());
    }

    #[test]
    fn detection_is_deterministic() {
        let detector = AnomalyDetector::new(AnomalyPolicy {
            min_area: 1,
            ..AnomalyPolicy::default()
        })
        .expect("valid");
        let regions: Vec<Region> = (1..20)
            .map(|i| round(i, i as usize * 3, [i as f32, 2.0 * i as f32, 0.5 * i as f32]))
            .collect();
        assert_eq!(detector.detect(&regions), detector.detect(&regions));
        let labels = detector.detect(&regions).flagged_labels;
        assert!(labels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rejects_bad_spacing() {
        let detector = AnomalyDetector::new(AnomalyPolicy::default()).expect("valid");
        assert!(detector.with_spacing([1.0, 0.0, 1.0]).is_err());
    }
}
