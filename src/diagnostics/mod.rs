//! Serializable run diagnostics: stage timings and the pipeline report.
mod report;
mod timing;

pub use report::{InputDescriptor, MeshSummary, PipelineReport};
pub use timing::{StageTiming, TimingBreakdown};

pub(crate) use timing::elapsed_ms;
