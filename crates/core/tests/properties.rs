#![forbid(unsafe_code)]

use brs_core::naming::{all_result_names, decode, encode, DEFAULT_SOURCE_NAME};
use brs_core::{project, RawResult};
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    let known = prop::sample::select(all_result_names(DEFAULT_SOURCE_NAME));
    prop_oneof![
        known,
        "shp-[a-z-]{0,24}",
        "shp-source-[a-z-]{0,12}-[a-z-]{0,20}",
        any::<String>(),
    ]
}

fn arb_batch() -> impl Strategy<Value = Vec<RawResult>> {
    prop::collection::vec((arb_name(), any::<String>()).prop_map(|(n, v)| RawResult::new(n, v)), 0..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Projection is total and deterministic.
    #[test]
    fn project_is_total_and_idempotent(batch in arb_batch()) {
        let first = project(&batch);
        let second = project(&batch);
        prop_assert!(first.sources.len() <= 2);
        prop_assert_eq!(first, second);
    }

    /// Whatever decodes, re-encodes to the same name.
    #[test]
    fn decode_inverts_encode(name in arb_name()) {
        if let Some(route) = decode(&name) {
            prop_assert_eq!(encode(&route), name.clone());
        }
    }

    /// Dropping names that do not decode never changes the projection.
    #[test]
    fn unknown_names_are_inert(batch in arb_batch()) {
        let known: Vec<RawResult> = batch.iter().filter(|r| decode(&r.name).is_some()).cloned().collect();
        prop_assert_eq!(project(&batch), project(&known));
    }
}
