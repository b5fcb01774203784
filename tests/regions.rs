mod common;

use common::synthetic_volume::{boxes_stack, two_squares_mask};
use slice_volume::anomaly::{AnomalyDetector, AnomalyPolicy, ExpectedZone};
use slice_volume::regions::{Connectivity, RegionLabeler};
use slice_volume::segment::{BinaryMask, ThresholdDirection, ThresholdOptions, ThresholdSegmenter};
use slice_volume::VolumeAssembler;

#[test]
fn two_squares_label_to_two_regions_at_their_centres() {
    let labeling = RegionLabeler::default().label(&two_squares_mask());
    assert_eq!(labeling.regions.len(), 2);

    let mut centroids: Vec<[f32; 3]> = labeling.regions.iter().map(|r| r.centroid).collect();
    centroids.sort_by(|a, b| a[0].total_cmp(&b[0]));
    assert_eq!(centroids, vec![[3.0, 3.0, 0.0], [12.0, 8.0, 0.0]]);
    assert!(labeling.regions.iter().all(|r| r.area == 25));
}

#[test]
fn all_zero_mask_emits_no_markers_for_any_policy() {
    let mask = BinaryMask::zeros([4, 6, 6]).expect("valid dims");
    let policies = [
        AnomalyPolicy::default(),
        AnomalyPolicy {
            min_area: 0,
            max_area: Some(1),
            max_elongation: Some(1.0),
            ..AnomalyPolicy::default()
        },
        AnomalyPolicy {
            min_area: 0,
            zones: vec![ExpectedZone {
                name: "everywhere".to_string(),
                min: [0.0; 3],
                max: [5.0; 3],
            }],
            ..AnomalyPolicy::default()
        },
    ];
    for connectivity in [Connectivity::Volumetric, Connectivity::PerSlice] {
        let labeling = RegionLabeler::new(connectivity).run(&mask);
        assert!(labeling.regions.is_empty());
        for policy in policies.clone() {
            let report = AnomalyDetector::new(policy).expect("valid policy").detect(&labeling.regions);
            assert!(report.markers.is_empty());
        }
    }
}

#[test]
fn threshold_directions_on_reference_values() {
    let values = [50u16, 100, 150];
    let above = ThresholdSegmenter::new(ThresholdOptions {
        threshold: 100.0,
        direction: ThresholdDirection::Above,
    })
    .expect("valid threshold");
    let below = ThresholdSegmenter::new(ThresholdOptions {
        threshold: 100.0,
        direction: ThresholdDirection::Below,
    })
    .expect("valid threshold");
    assert_eq!(above.segment_values(&values), vec![0, 0, 1]);
    assert_eq!(below.segment_values(&values), vec![1, 0, 0]);
}

#[test]
fn boxes_are_classified_by_size_shape_and_zone() {
    let _ = env_logger::builder().is_test(true).try_init();
    // [x, y, z] inclusive boxes inside a 10 x 20 x 40 volume
    let boxes = [
        ([2, 2, 1], [6, 6, 5]),    // 125 voxels, compact, in zone
        ([20, 2, 1], [37, 3, 2]),  // 72 voxels, long and thin
        ([2, 12, 1], [11, 19, 8]), // 640 voxels
        ([25, 12, 4], [29, 16, 8]), // 125 voxels, outside the zone
        ([32, 15, 0], [32, 15, 0]), // single voxel noise
    ];
    let stack = boxes_stack([10, 20, 40], &boxes);
    let volume = VolumeAssembler::default()
        .assemble(&stack)
        .expect("valid stack");
    let mask = ThresholdSegmenter::new(ThresholdOptions::default())
        .and_then(|s| s.segment_volume(&volume))
        .expect("segmentation");
    let labeling = RegionLabeler::default().label(&mask);
    assert_eq!(labeling.regions.len(), 5);

    let policy = AnomalyPolicy {
        min_area: 50,
        max_area: Some(600),
        max_elongation: Some(3.0),
        expected_count: Some(3),
        zones: vec![
            ExpectedZone {
                name: "left".to_string(),
                min: [0.0, 0.0, 0.0],
                max: [19.0, 19.0, 9.0],
            },
            ExpectedZone {
                name: "far".to_string(),
                min: [0.0, 0.0, 20.0],
                max: [39.0, 19.0, 30.0],
            },
        ],
        ..AnomalyPolicy::default()
    };
    let report = AnomalyDetector::new(policy)
        .expect("valid policy")
        .detect(&labeling.regions);

    assert_eq!(report.considered, 4);
    assert_eq!(report.count_mismatch, Some(1));
    assert_eq!(report.empty_zones, vec!["far".to_string()]);
    let mut tags: Vec<&str> = report.markers.iter().map(|m| m.tag.as_str()).collect();
    tags.sort_unstable();
    assert_eq!(tags, vec!["anomaly", "elongated", "out_of_zone", "oversized"]);
}

#[test]
fn per_slice_labels_count_each_plane_separately() {
    let stack = boxes_stack([6, 8, 8], &[([1, 1, 1], [3, 3, 4])]);
    let volume = VolumeAssembler::default()
        .assemble(&stack)
        .expect("valid stack");
    let mask = ThresholdSegmenter::new(ThresholdOptions::default())
        .and_then(|s| s.segment_volume(&volume))
        .expect("segmentation");

    let volumetric = RegionLabeler::new(Connectivity::Volumetric).run(&mask);
    let per_slice = RegionLabeler::new(Connectivity::PerSlice).run(&mask);
    assert_eq!(volumetric.regions.len(), 1);
    assert_eq!(volumetric.regions[0].area, 36);
    assert_eq!(per_slice.regions.len(), 4);
    let slices: Vec<f32> = per_slice.regions.iter().map(|r| r.centroid[2]).collect();
    assert_eq!(slices, vec![1.0, 2.0, 3.0, 4.0]);
    assert!(per_slice.regions.iter().all(|r| r.area == 9));
}

#[test]
fn box_longer_than_extent_limit_is_flagged() {
    let boxes = [
        ([2, 2, 1], [6, 6, 5]),   // 5 x 5 x 5
        ([20, 2, 1], [34, 4, 3]), // 15 x 3 x 3
    ];
    let stack = boxes_stack([10, 20, 40], &boxes);
    let volume = VolumeAssembler::default()
        .assemble(&stack)
        .expect("valid stack");
    let mask = ThresholdSegmenter::new(ThresholdOptions::default())
        .and_then(|s| s.segment_volume(&volume))
        .expect("segmentation");
    let labeling = RegionLabeler::default().label(&mask);
    assert_eq!(labeling.regions.len(), 2);

    let policy = AnomalyPolicy {
        min_area: 50,
        max_extent: Some([8, 8, 8]),
        ..AnomalyPolicy::default()
    };
    let report = AnomalyDetector::new(policy)
        .expect("valid policy")
        .detect(&labeling.regions);
    let mut tags: Vec<(usize, &str)> = labeling
        .regions
        .iter()
        .zip(&report.markers)
        .map(|(r, m)| (r.bbox.size()[0], m.tag.as_str()))
        .collect();
    tags.sort_unstable();
    assert_eq!(tags, vec![(5, "anomaly"), (15, "extent")]);
}
