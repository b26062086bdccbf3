//! BuildRun status records populated from task results.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single `(name, value)` result as emitted by the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    pub name: String,
    pub value: String,
}

impl RawResult {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSourceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSourceResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Result for one build source. The projector sets exactly one of `git`/`bundle`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSourceResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<BundleSourceResult>,
}

/// Result for the produced image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Outcome of one projection: up to two sources (git first, bundle second) and the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub sources: SmallVec<[SourceResult; 2]>,
    pub output: Output,
}

/// The part of a BuildRun's status this crate populates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRunStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Output>,
}

impl Projection {
    /// Write into a status: output is replaced, sources are appended to the existing list.
    pub fn apply_to(self, status: &mut BuildRunStatus) {
        status.output = Some(self.output);
        status.sources.extend(self.sources);
    }

    pub fn into_status(self) -> BuildRunStatus {
        let mut status = BuildRunStatus::default();
        self.apply_to(&mut status);
        status
    }
}
