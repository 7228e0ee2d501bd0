//! Property tests: escaping round trips for the text-based codecs.

use proptest::prelude::*;
use transcat::{Store, Unit, formats, traits::Codec};

fn key_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_.]{0,15}").expect("valid key regex")
}

/// Values exercising the PO escape set: backslashes, quotes, newlines,
/// tabs, plus ordinary text.
fn po_value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 \\\\\"\n\téàü]{0,30}").expect("valid value regex")
}

/// Values exercising the Properties escape set, including non-ASCII and
/// astral characters.
fn properties_value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 =:#!\\\\\n\téàüß☃😀]{0,30}")
        .expect("valid value regex")
}

fn build_store(pairs: &[(String, String)], lang: Option<&str>) -> Store {
    let mut store = Store::new();
    for (key, value) in pairs {
        let mut unit = Unit::new(key.clone(), value.clone());
        unit.lang = lang.map(str::to_owned);
        store.add_unit(unit);
    }
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn po_roundtrip_preserves_keys_and_values(
        pairs in prop::collection::btree_map(key_strategy(), po_value_strategy(), 1..8)
    ) {
        let pairs: Vec<(String, String)> = pairs.into_iter().collect();
        let store = build_store(&pairs, None);
        let encoded = formats::po::Format::encode_to_string(&store)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let reparsed = formats::po::Format::decode_str(&encoded, None)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(store, reparsed);
    }

    #[test]
    fn properties_roundtrip_preserves_keys_and_values(
        pairs in prop::collection::btree_map(key_strategy(), properties_value_strategy(), 1..8)
    ) {
        let pairs: Vec<(String, String)> = pairs.into_iter().collect();
        let store = build_store(&pairs, None);
        let encoded = formats::properties::Format::encode_to_string(&store)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let reparsed = formats::properties::Format::decode_str(&encoded, None)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(store, reparsed);
    }

    #[test]
    fn ts_roundtrip_preserves_keys_and_values(
        pairs in prop::collection::btree_map(key_strategy(), po_value_strategy(), 1..8)
    ) {
        let pairs: Vec<(String, String)> = pairs.into_iter().collect();
        let store = build_store(&pairs, Some("fr"));
        let encoded = formats::ts::Format::encode_to_string(&store)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let reparsed = formats::ts::Format::decode_str(&encoded, None)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(store, reparsed);
    }
}
