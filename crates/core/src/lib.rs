//! Projection of TaskRun results into BuildRun status.
//!
//! Build strategies report what they did as flat `(name, value)` results whose names
//! follow the convention in [`naming`]. [`project`] decodes those names and folds the
//! values into the nested [`SourceResult`]/[`Output`] records the BuildRun status carries.

#![forbid(unsafe_code)]

pub mod error;
pub mod naming;
mod project;
mod status;
pub mod taskrun;

pub use error::{Error, Result};
pub use project::{project, project_pairs, update_status_from_results};
pub use status::{BuildRunStatus, BundleSourceResult, GitSourceResult, Output, Projection, RawResult, SourceResult};
pub use taskrun::{project_taskrun, results_from_taskrun};

pub mod prelude {
    pub use super::naming::{decode, encode, Route, DEFAULT_SOURCE_NAME, RESULT_PREFIX};
    pub use super::{project, BuildRunStatus, Output, Projection, RawResult, SourceResult};
}
