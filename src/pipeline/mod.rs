//! End-to-end orchestration and the caller-owned session.
//!
//! `Pipeline::run` assembles the stack once and feeds the shared volume to
//! both branches: isosurface extraction, and segmentation followed by region
//! labelling and anomaly detection. Detected markers are appended to the
//! `Session`; manual markers arrive through `MarkerCommand`s.
mod params;
mod runner;
mod session;

pub use params::PipelineParams;
pub use runner::{Pipeline, PipelineOutput};
pub use session::{MarkerCommand, Session};
