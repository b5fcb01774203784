mod common;

use common::synthetic_volume::{distance, sphere_stack, volume_center, INSIDE};
use slice_volume::image::{ImageU16, ImageView};
use slice_volume::isosurface::IsosurfaceOptions;
use slice_volume::segment::ProbabilityMaskModel;
use slice_volume::{
    AnomalyPolicy, IsosurfaceExtractor, Pipeline, PipelineParams, Session, Slice, SliceStack,
    VolumeAssembler, VolumeError,
};

const N: usize = 24;
const RADIUS: f32 = 7.0;

#[test]
fn sphere_surface_lies_within_one_voxel_diagonal() {
    let _ = env_logger::builder().is_test(true).try_init();
    let volume = VolumeAssembler::default()
        .assemble(&sphere_stack(N, RADIUS))
        .expect("valid stack");
    let mesh = IsosurfaceExtractor::with_isovalue(INSIDE as f32 / 2.0)
        .extract(&volume)
        .expect("extraction succeeds");

    assert!(!mesh.is_empty(), "sphere produced an empty mesh");
    assert!(mesh.is_valid(), "face index out of range");
    let c = volume_center(N);
    let tolerance = 3.0f32.sqrt();
    for v in &mesh.vertices {
        let d = distance(*v, [c, c, c]);
        assert!(
            (d - RADIUS).abs() <= tolerance,
            "vertex {v:?} at distance {d:.3} from centre, expected {RADIUS} +- {tolerance:.3}"
        );
    }
}

#[test]
fn extraction_is_idempotent() {
    let volume = VolumeAssembler::default()
        .assemble(&sphere_stack(N, RADIUS))
        .expect("valid stack");
    let extractor = IsosurfaceExtractor::new(IsosurfaceOptions {
        isovalue: 1500.0,
        ..Default::default()
    });
    let first = extractor.extract(&volume).expect("first extraction");
    let second = extractor.extract(&volume).expect("second extraction");
    assert_eq!(first.vertex_count(), second.vertex_count());
    assert_eq!(first.face_count(), second.face_count());
    assert_eq!(first, second);
}

#[test]
fn assembled_volume_reproduces_every_slice() {
    let stack = sphere_stack(9, 3.0);
    let volume = VolumeAssembler::default()
        .assemble(&stack)
        .expect("valid stack");
    assert_eq!(volume.depth(), stack.len());
    for slice in stack.iter() {
        let view = volume.slice(slice.index);
        assert_eq!(view.to_packed(), slice.data, "slice {} differs", slice.index);
    }
}

#[test]
fn mismatched_columns_fail_without_partial_volume() {
    let mut stack = SliceStack::new();
    stack.push(Slice::new(0, 4, 4, vec![0; 16]));
    stack.push(Slice::new(1, 4, 5, vec![0; 20]));
    let result = VolumeAssembler::default().assemble(&stack);
    assert_eq!(
        result,
        Err(VolumeError::InconsistentGeometry {
            index: 1,
            expected: (4, 4),
            found: (4, 5),
        })
    );
}

#[test]
fn pipeline_flags_sphere_and_records_markers() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = PipelineParams {
        anomaly: AnomalyPolicy {
            max_area: Some(500),
            ..AnomalyPolicy::default()
        },
        ..PipelineParams::default()
    };
    let pipeline = Pipeline::new(params).expect("valid params");
    let mut session = Session::new();
    let output = pipeline
        .run(&sphere_stack(N, RADIUS), &mut session)
        .expect("pipeline run");

    assert_eq!(output.labeling.regions.len(), 1);
    let region = &output.labeling.regions[0];
    assert!(region.area > 500, "sphere area {} too small", region.area);
    assert_eq!(session.markers().len(), 1);
    let marker = &session.markers().as_slice()[0];
    assert_eq!(marker.tag, "oversized");
    let c = volume_center(N);
    assert!(distance(marker.position, [c, c, c]) < 1e-3);
    assert_eq!(marker.slice, c.round() as usize);

    let report = output.report();
    assert_eq!(report.region_count, 1);
    assert_eq!(report.input.depth, N);
    assert!(report.mesh.is_some_and(|m| m.faces > 0));
}

#[test]
fn probability_model_can_replace_threshold() {
    let pipeline = Pipeline::new(PipelineParams {
        extract_surface: false,
        ..PipelineParams::default()
    })
    .expect("valid params");
    let model = ProbabilityMaskModel::new(|slice: &ImageU16<'_>| -> Vec<f32> {
        slice
            .to_packed()
            .into_iter()
            .map(|v| if v > 0 { 0.9 } else { 0.1 })
            .collect()
    });

    let stack = sphere_stack(N, RADIUS);
    let mut by_model = Session::new();
    let mut by_threshold = Session::new();
    let from_model = pipeline
        .run_with_producer(&stack, &model, &mut by_model)
        .expect("model run");
    let from_threshold = pipeline.run(&stack, &mut by_threshold).expect("threshold run");

    assert_eq!(from_model.mask, from_threshold.mask);
    assert_eq!(by_model.markers(), by_threshold.markers());
}

#[test]
fn all_zero_volume_yields_no_regions_or_markers() {
    let stack = SliceStack::from_buffers(8, 8, vec![vec![0; 64]; 4]);
    let pipeline = Pipeline::new(PipelineParams {
        anomaly: AnomalyPolicy {
            min_area: 0,
            expected_count: Some(2),
            ..AnomalyPolicy::default()
        },
        ..PipelineParams::default()
    })
    .expect("valid params");
    let mut session = Session::new();
    let output = pipeline.run(&stack, &mut session).expect("pipeline run");
    assert!(output.mesh.as_ref().is_some_and(|m| m.is_empty()));
    assert_eq!(output.mask.count_set(), 0);
    assert!(output.labeling.regions.is_empty());
    assert!(output.anomalies.markers.is_empty());
    assert_eq!(output.anomalies.count_mismatch, Some(-2));
    assert!(session.markers().is_empty());
}
