use super::params::PipelineParams;
use super::session::Session;
use crate::anomaly::{AnomalyDetector, AnomalyReport};
use crate::diagnostics::{
    elapsed_ms, InputDescriptor, MeshSummary, PipelineReport, TimingBreakdown,
};
use crate::error::VolumeError;
use crate::isosurface::{IsosurfaceExtractor, Mesh};
use crate::regions::{Labeling, RegionLabeler};
use crate::segment::{segment_volume_with, BinaryMask, MaskProducer, ThresholdSegmenter};
use crate::slices::SliceStack;
use crate::volume::{Volume, VolumeAssembler};
use log::{debug, info};
use std::time::Instant;

/// Everything one run produced.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub volume: Volume,
    /// `None` when surface extraction is disabled.
    pub mesh: Option<Mesh>,
    pub mask: BinaryMask,
    /// Boundary of the mask, `None` when mask surface extraction is disabled.
    pub mask_mesh: Option<Mesh>,
    pub labeling: Labeling,
    pub anomalies: AnomalyReport,
    pub timings: TimingBreakdown,
}

impl PipelineOutput {
    pub fn report(&self) -> PipelineReport {
        PipelineReport {
            input: InputDescriptor::from_volume(&self.volume),
            mesh: self.mesh.as_ref().map(MeshSummary::from_mesh),
            mask_mesh: self.mask_mesh.as_ref().map(MeshSummary::from_mesh),
            mask_voxels: self.mask.count_set(),
            region_count: self.labeling.regions.len(),
            anomalies: self.anomalies.clone(),
            timings: self.timings.clone(),
        }
    }
}

/// Assembles a slice stack and runs both the surface and anomaly branches.
///
/// Stages hold no state between runs; the only thing a run mutates is the
/// caller's `Session`, which receives the detected markers.
#[derive(Clone, Debug)]
pub struct Pipeline {
    params: PipelineParams,
    assembler: VolumeAssembler,
    extractor: IsosurfaceExtractor,
    segmenter: ThresholdSegmenter,
    labeler: RegionLabeler,
}

impl Pipeline {
    /// Validate `params` and build every stage.
    pub fn new(params: PipelineParams) -> Result<Self, VolumeError> {
        crate::volume::validate_spacing(params.assembler.spacing)?;
        if !params.isosurface.isovalue.is_finite() {
            return Err(VolumeError::invalid(format!(
                "isovalue must be finite, got {}",
                params.isosurface.isovalue
            )));
        }
        params.anomaly.validate()?;
        let segmenter = ThresholdSegmenter::new(params.segmentation)?;
        Ok(Self {
            assembler: VolumeAssembler::new(params.assembler),
            extractor: IsosurfaceExtractor::new(params.isosurface),
            segmenter,
            labeler: RegionLabeler::new(params.connectivity),
            params,
        })
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Run with the threshold segmenter built from the parameters.
    pub fn run(
        &self,
        stack: &SliceStack,
        session: &mut Session,
    ) -> Result<PipelineOutput, VolumeError> {
        self.run_with_producer(stack, &self.segmenter, session)
    }

    /// Run with any mask producer in place of the threshold segmenter.
    ///
    /// On error the session is left untouched.
    pub fn run_with_producer<P>(
        &self,
        stack: &SliceStack,
        producer: &P,
        session: &mut Session,
    ) -> Result<PipelineOutput, VolumeError>
    where
        P: MaskProducer + Sync + ?Sized,
    {
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let start = Instant::now();
        let volume = self.assembler.assemble(stack)?;
        timings.record_since("assemble", start);

        let mesh = if self.params.extract_surface {
            let start = Instant::now();
            let mesh = self.extractor.extract(&volume)?;
            timings.record_since("isosurface", start);
            Some(mesh)
        } else {
            None
        };

        let start = Instant::now();
        let mask = segment_volume_with(producer, &volume)?;
        timings.record_since("segment", start);

        let mask_mesh = if self.params.extract_mask_surface {
            let start = Instant::now();
            let mesh = self.extractor.extract_mask(&mask, volume.spacing())?;
            timings.record_since("mask_surface", start);
            Some(mesh)
        } else {
            None
        };

        let start = Instant::now();
        let labeling = self.labeler.run(&mask);
        timings.record_since("label", start);

        let start = Instant::now();
        let detector =
            AnomalyDetector::new(self.params.anomaly.clone())?.with_spacing(volume.spacing())?;
        let anomalies = detector.detect(&labeling.regions);
        timings.record_since("detect", start);

        timings.total_ms = elapsed_ms(total_start);
        for stage in &timings.stages {
            debug!("Pipeline::run stage={} elapsed_ms={:.3}", stage.label, stage.elapsed_ms);
        }
        info!(
            "Pipeline::run dims={:?} faces={} mask_faces={} regions={} markers={} total_ms={:.3}",
            volume.dims(),
            mesh.as_ref().map_or(0, Mesh::face_count),
            mask_mesh.as_ref().map_or(0, Mesh::face_count),
            labeling.regions.len(),
            anomalies.markers.len(),
            timings.total_ms
        );

        session.clamp_slice(volume.depth());
        session.record(anomalies.markers.iter().cloned());

        Ok(PipelineOutput {
            volume,
            mesh,
            mask,
            mask_mesh,
            labeling,
            anomalies,
            timings,
        })
    }
}
