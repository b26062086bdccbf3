//! Result-name wire contract shared by build strategies (producers) and the projector.
//!
//! Names look like `shp-source-<source>-<field>` for source results and `shp-<field>`
//! for output results. Field-key spellings and the separator are part of the contract
//! with whatever emits TaskRun results; changing either breaks existing strategies.

#![forbid(unsafe_code)]

use std::fmt;

/// Prefix every result name starts with. Both `encode` and `decode` go through this.
pub const RESULT_PREFIX: &str = "shp";

/// Identifier used for `spec.source`, which has no user-assignable name.
pub const DEFAULT_SOURCE_NAME: &str = "default";

const SEP: char = '-';
const SOURCE_SEGMENT: &str = "source";

pub const COMMIT_SHA: &str = "commit-sha";
pub const COMMIT_AUTHOR: &str = "commit-author";
pub const BUNDLE_IMAGE_DIGEST: &str = "bundle-image-digest";
pub const IMAGE_DIGEST: &str = "image-digest";
pub const IMAGE_SIZE: &str = "image-size";

/// Writer action for a field under `shp-source-<source>-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceField {
    GitCommitSha,
    GitCommitAuthor,
    BundleDigest,
}

/// Writer action for a field under `shp-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputField {
    Digest,
    Size,
}

/// Field key -> source writer. Adding a source result is one line here plus its variant.
pub const SOURCE_ROUTES: [(&str, SourceField); 3] = [
    (COMMIT_SHA, SourceField::GitCommitSha),
    (COMMIT_AUTHOR, SourceField::GitCommitAuthor),
    (BUNDLE_IMAGE_DIGEST, SourceField::BundleDigest),
];

/// Field key -> output writer.
pub const OUTPUT_ROUTES: [(&str, OutputField); 2] = [
    (IMAGE_DIGEST, OutputField::Digest),
    (IMAGE_SIZE, OutputField::Size),
];

impl SourceField {
    pub fn from_key(key: &str) -> Option<Self> {
        SOURCE_ROUTES.iter().find(|(k, _)| *k == key).map(|(_, f)| *f)
    }

    pub fn key(self) -> &'static str {
        SOURCE_ROUTES
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(k, _)| *k)
            .unwrap_or_default()
    }
}

impl OutputField {
    pub fn from_key(key: &str) -> Option<Self> {
        OUTPUT_ROUTES.iter().find(|(k, _)| *k == key).map(|(_, f)| *f)
    }

    pub fn key(self) -> &'static str {
        OUTPUT_ROUTES
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(k, _)| *k)
            .unwrap_or_default()
    }
}

/// Decoded meaning of a result name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Source { source: &'a str, field: SourceField },
    Output(OutputField),
}

impl fmt::Display for Route<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Source { source, field } => {
                write!(f, "{RESULT_PREFIX}{SEP}{SOURCE_SEGMENT}{SEP}{source}{SEP}{}", field.key())
            }
            Route::Output(field) => write!(f, "{RESULT_PREFIX}{SEP}{}", field.key()),
        }
    }
}

/// Build the result name for a route. Inverse of [`decode`].
pub fn encode(route: &Route<'_>) -> String {
    route.to_string()
}

pub fn source_result_name(source: &str, field: SourceField) -> String {
    encode(&Route::Source { source, field })
}

pub fn output_result_name(field: OutputField) -> String {
    encode(&Route::Output(field))
}

/// Decode a result name. Never panics; anything that is not exactly an encoded
/// route (wrong prefix, unknown field key, empty source) yields `None`.
pub fn decode(name: &str) -> Option<Route<'_>> {
    let rest = name.strip_prefix(RESULT_PREFIX)?.strip_prefix(SEP)?;

    if let Some(tail) = rest.strip_prefix(SOURCE_SEGMENT).and_then(|r| r.strip_prefix(SEP)) {
        let source_route = SOURCE_ROUTES.iter().find_map(|(key, field)| {
            let source = tail.strip_suffix(key)?.strip_suffix(SEP)?;
            (!source.is_empty()).then_some(Route::Source { source, field: *field })
        });
        if source_route.is_some() {
            return source_route;
        }
    }

    OutputField::from_key(rest).map(Route::Output)
}

/// Every result name a strategy may emit for `source`, output results last.
pub fn all_result_names(source: &str) -> Vec<String> {
    SOURCE_ROUTES
        .iter()
        .map(|(_, field)| source_result_name(source, *field))
        .chain(OUTPUT_ROUTES.iter().map(|(_, field)| output_result_name(*field)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_stable() {
        assert_eq!(source_result_name(DEFAULT_SOURCE_NAME, SourceField::GitCommitSha), "shp-source-default-commit-sha");
        assert_eq!(source_result_name(DEFAULT_SOURCE_NAME, SourceField::GitCommitAuthor), "shp-source-default-commit-author");
        assert_eq!(source_result_name(DEFAULT_SOURCE_NAME, SourceField::BundleDigest), "shp-source-default-bundle-image-digest");
        assert_eq!(output_result_name(OutputField::Digest), "shp-image-digest");
        assert_eq!(output_result_name(OutputField::Size), "shp-image-size");
    }

    #[test]
    fn routing_tables_are_unique_and_complete() {
        let mut keys: Vec<&str> = SOURCE_ROUTES.iter().map(|(k, _)| *k).collect();
        keys.extend(OUTPUT_ROUTES.iter().map(|(k, _)| *k));
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);

        for field in [SourceField::GitCommitSha, SourceField::GitCommitAuthor, SourceField::BundleDigest] {
            assert_eq!(SourceField::from_key(field.key()), Some(field));
        }
        for field in [OutputField::Digest, OutputField::Size] {
            assert_eq!(OutputField::from_key(field.key()), Some(field));
        }
    }

    #[test]
    fn decode_recognises_every_contract_name() {
        for name in all_result_names(DEFAULT_SOURCE_NAME) {
            let route = decode(&name).expect("contract name must decode");
            assert_eq!(encode(&route), name);
        }
    }

    #[test]
    fn decode_keeps_source_identifier() {
        assert_eq!(
            decode("shp-source-my-repo-commit-sha"),
            Some(Route::Source { source: "my-repo", field: SourceField::GitCommitSha })
        );
    }

    #[test]
    fn decode_rejects_near_misses() {
        for name in [
            "",
            "shp",
            "shp-",
            "shp-source-",
            "shp-source--commit-sha",
            "shp-source-commit-sha",
            "shp-source-default-commit-shaa",
            "shp-source-default-image-digest",
            "shp-commit-sha",
            "shp-bundle-image-digest",
            "shpimage-digest",
            "shp_image-digest",
            "xshp-image-digest",
            "SHP-image-digest",
            "shp-image-digest-",
            "image-digest",
            "shp-source-default-",
        ] {
            assert_eq!(decode(name), None, "{name:?} should not decode");
        }
    }
}
