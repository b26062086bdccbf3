//! Fold a batch of task results into BuildRun status records.

use tracing::{debug, trace};

use crate::naming::{decode, OutputField, Route, SourceField, DEFAULT_SOURCE_NAME};
use crate::status::{BuildRunStatus, BundleSourceResult, GitSourceResult, Output, Projection, RawResult, SourceResult};

/// Call-local accumulator. `None` means the composite was never written and must not be emitted.
#[derive(Default)]
struct Accumulator {
    git: Option<GitSourceResult>,
    bundle: Option<BundleSourceResult>,
    output: Output,
}

impl Accumulator {
    /// Returns false when the route is recognised but has no slot in this projection.
    fn write(&mut self, route: Route<'_>, value: &str) -> bool {
        let value = Some(value.to_owned());
        match route {
            Route::Source { source, .. } if source != DEFAULT_SOURCE_NAME => return false,
            Route::Source { field: SourceField::GitCommitSha, .. } => {
                self.git.get_or_insert_with(Default::default).commit_sha = value;
            }
            Route::Source { field: SourceField::GitCommitAuthor, .. } => {
                self.git.get_or_insert_with(Default::default).commit_author = value;
            }
            Route::Source { field: SourceField::BundleDigest, .. } => {
                self.bundle.get_or_insert_with(Default::default).digest = value;
            }
            Route::Output(OutputField::Digest) => self.output.digest = value,
            Route::Output(OutputField::Size) => self.output.size = value,
        }
        true
    }

    fn finish(self) -> Projection {
        let mut projection = Projection { output: self.output, ..Default::default() };
        if let Some(git) = self.git {
            projection.sources.push(SourceResult { name: DEFAULT_SOURCE_NAME.to_string(), git: Some(git), bundle: None });
        }
        if let Some(bundle) = self.bundle {
            projection.sources.push(SourceResult { name: DEFAULT_SOURCE_NAME.to_string(), git: None, bundle: Some(bundle) });
        }
        projection
    }
}

/// Project raw results. Later duplicates win; unknown names are ignored.
pub fn project(results: &[RawResult]) -> Projection {
    project_pairs(results.iter().map(|r| (r.name.as_str(), r.value.as_str())))
}

/// Same as [`project`] over borrowed `(name, value)` pairs, processed in iteration order.
pub fn project_pairs<'a, I>(results: I) -> Projection
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut acc = Accumulator::default();
    let mut ignored = 0usize;
    for (name, value) in results {
        let written = decode(name).map(|route| acc.write(route, value)).unwrap_or(false);
        if !written {
            trace!(name, "ignoring task result");
            ignored += 1;
        }
    }
    let projection = acc.finish();
    debug!(
        sources = projection.sources.len(),
        digest = projection.output.digest.is_some(),
        size = projection.output.size.is_some(),
        ignored,
        "projected task results"
    );
    projection
}

/// Project `results` and write them into `status` (see [`Projection::apply_to`]).
pub fn update_status_from_results(status: &mut BuildRunStatus, results: &[RawResult]) {
    project(results).apply_to(status);
}
