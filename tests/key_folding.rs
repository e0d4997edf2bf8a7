use rstest::rstest;
use serde_json::{json, Value};
use toon_codec::{
    decode_value, encode_value, DecodeOptions, EncodeOptions, ExpandPaths, KeyFolding,
};

fn folding() -> EncodeOptions {
    EncodeOptions::new().with_key_folding(KeyFolding::Safe)
}

fn encode_folded(value: &Value) -> String {
    encode_value(value, &folding()).unwrap()
}

#[rstest]
fn folding_is_off_by_default() {
    let value = json!({"a": {"b": {"c": 1}}});
    let encoded = encode_value(&value, &EncodeOptions::default()).unwrap();
    assert_eq!(encoded, "a:\n  b:\n    c: 1");
}

#[rstest]
#[case(json!({"a": {"b": {"c": 1}}}), "a.b.c: 1")]
#[case(json!({"a": {"b": 1}, "x": 2}), "a.b: 1\nx: 2")]
#[case(json!({"a": {"b": [1, 2]}}), "a.b[2]: 1,2")]
#[case(json!({"a": {"b": {}}}), "a.b:")]
#[case(json!({"a": {"b": {"x": 1, "y": 2}}}), "a.b:\n  x: 1\n  y: 2")]
fn folds_single_key_chains(#[case] value: Value, #[case] expected: &str) {
    assert_eq!(encode_folded(&value), expected);
}

#[rstest]
fn folded_output_expands_back() {
    let value = json!({"a": {"b": {"c": 1}}});
    let encoded = encode_folded(&value);
    let opts = DecodeOptions::new().with_expand_paths(ExpandPaths::Safe);
    assert_eq!(decode_value(&encoded, &opts).unwrap(), value);
}

#[rstest]
fn flatten_depth_limits_the_chain() {
    let value = json!({"a": {"b": {"c": 1}}});
    let opts = folding().with_flatten_depth(Some(2));
    assert_eq!(encode_value(&value, &opts).unwrap(), "a.b:\n  c: 1");

    // The leftover budget travels into the folded tail.
    let value = json!({"a": {"b": {"c": {"d": 1}}}});
    let opts = folding().with_flatten_depth(Some(2));
    assert_eq!(encode_value(&value, &opts).unwrap(), "a.b:\n  c:\n    d: 1");
}

#[rstest]
#[case(Some(0))]
#[case(Some(1))]
fn tiny_flatten_depth_disables_folding(#[case] flatten_depth: Option<usize>) {
    let value = json!({"a": {"b": 1}});
    let opts = folding().with_flatten_depth(flatten_depth);
    assert_eq!(encode_value(&value, &opts).unwrap(), "a:\n  b: 1");
}

#[rstest]
fn non_identifier_segments_block_folding() {
    let value = json!({"a": {"odd-key": {"c": 1}}});
    assert_eq!(encode_folded(&value), "a:\n  odd-key:\n    c: 1");

    let value = json!({"a": {"9lives": 1}});
    assert_eq!(encode_folded(&value), "a:\n  \"9lives\": 1");
}

#[rstest]
fn sibling_collision_blocks_folding() {
    let value = json!({"a": {"b": 1}, "a.b": 2});
    assert_eq!(encode_folded(&value), "a:\n  b: 1\na.b: 2");
}

#[rstest]
fn root_literal_collision_blocks_nested_folding() {
    // Folding `c.d` inside the folded tail of `a.b` would shadow the
    // literal root key `a.b.c.d`, so that chain stays unfolded.
    let value = json!({"a": {"b": {"c": {"d": 1}, "z": 9}}, "a.b.c.d": 5});
    let encoded = encode_folded(&value);
    assert_eq!(encoded, "a.b:\n  c:\n    d: 1\n  z: 9\na.b.c.d: 5");
}

#[rstest]
fn arrays_and_primitives_never_fold_their_key() {
    let value = json!({"a": [1], "b": 2});
    assert_eq!(encode_folded(&value), "a[1]: 1\nb: 2");
}

#[rstest]
fn folding_applies_inside_nested_objects() {
    let value = json!({"top": {"x": 1, "a": {"b": {"c": 2}}}});
    assert_eq!(encode_folded(&value), "top:\n  x: 1\n  a.b.c: 2");
}

#[rstest]
fn folded_keys_round_trip_without_expansion_as_literals() {
    let value = json!({"a": {"b": 1}});
    let encoded = encode_folded(&value);
    assert_eq!(encoded, "a.b: 1");
    let plain = decode_value(&encoded, &DecodeOptions::default()).unwrap();
    assert_eq!(plain, json!({"a.b": 1}));
}
