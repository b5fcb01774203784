//! JSON configuration for the command-line tools.
//!
//! Sections are deserialized into raw structs and turned into validated
//! stage parameters by `resolve()`, which reports bad values as
//! `VolumeError::InvalidConfiguration`.
pub mod slice_pipeline;

pub use slice_pipeline::{load_config, parse_config, SlicePipelineConfig};
