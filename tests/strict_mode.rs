use rstest::rstest;
use serde_json::{json, Value};
use toon_codec::{decode_value, DecodeOptions, ErrorKind};

fn strict() -> DecodeOptions {
    DecodeOptions::default()
}

fn lenient() -> DecodeOptions {
    DecodeOptions::new().with_strict(false)
}

fn strict_err(input: &str) -> toon_codec::Error {
    decode_value(input, &strict()).unwrap_err()
}

#[rstest]
#[case("numbers[3]: 1,2", ErrorKind::Range)]
#[case("items[1]:\n  - a\n  - b", ErrorKind::Validation)]
#[case("items[2]:\n  - a", ErrorKind::Range)]
#[case("users[1]{id}:\n  1\n  2", ErrorKind::Validation)]
#[case("users[2]{id}:\n  1", ErrorKind::Range)]
#[case("parent:\n   child: v", ErrorKind::Indentation)]
#[case("parent:\n\tchild: v", ErrorKind::Indentation)]
#[case("users[2]{id}:\n  1\n\n  2", ErrorKind::Validation)]
#[case("[1]{a|b}: 1", ErrorKind::Validation)]
#[case("users[2]{id,name}:\n  1\n  2,Bob", ErrorKind::Validation)]
fn strict_mode_rejections(#[case] input: &str, #[case] kind: ErrorKind) {
    let err = strict_err(input);
    assert_eq!(err.kind, kind, "{input:?} -> {err}");
}

#[rstest]
#[case("k: \"a\\qb\"")]
#[case("k: \"open")]
#[case("k: \"x\" tail")]
#[case("bad-key: 1")]
#[case("a: 1\nbare line")]
fn strict_mode_syntax_rejections(#[case] input: &str) {
    assert_eq!(strict_err(input).kind, ErrorKind::Syntax, "{input:?}");
}

#[rstest]
fn indentation_errors_carry_the_line_number() {
    let err = strict_err("parent:\n\tchild: v");
    assert_eq!(err.location.unwrap().line, 2);
    assert!(err.to_string().contains("tabs not allowed in indentation"));
}

#[rstest]
#[case("numbers[3]: 1,2", json!({"numbers": [1, 2]}))]
#[case("items[1]:\n  - a\n  - b", json!({"items": ["a", "b"]}))]
#[case("bad-key: 1", json!({"bad-key": 1}))]
#[case("parent:\n\tchild: v", json!({"parent": {"child": "v"}}))]
#[case("parent:\n   child: v", json!({"parent": {"child": "v"}}))]
#[case("users[2]{id}:\n  1\n\n  2", json!({"users": [{"id": 1}, {"id": 2}]}))]
fn lenient_mode_accepts_and_repairs(#[case] input: &str, #[case] expected: Value) {
    assert_eq!(decode_value(input, &lenient()).unwrap(), expected, "{input:?}");
}

#[rstest]
fn blank_lines_outside_array_bodies_are_fine() {
    let input = "users[2]{id}:\n  1\n  2\n\nnext: done";
    assert_eq!(
        decode_value(input, &strict()).unwrap(),
        json!({"users": [{"id": 1}, {"id": 2}], "next": "done"})
    );

    let input = "a: 1\n\n\nb: 2";
    assert_eq!(
        decode_value(input, &strict()).unwrap(),
        json!({"a": 1, "b": 2})
    );
}

#[rstest]
fn blank_line_inside_list_array_is_rejected() {
    let input = "items[2]:\n  - a\n\n  - b";
    assert_eq!(strict_err(input).kind, ErrorKind::Validation);
    assert_eq!(
        decode_value(input, &lenient()).unwrap(),
        json!({"items": ["a", "b"]})
    );
}

#[rstest]
fn depth_jumps_are_rejected_in_both_modes() {
    let input = "a:\n    b: 1";
    assert_eq!(strict_err(input).kind, ErrorKind::Indentation);
    assert!(decode_value(input, &lenient()).is_err());
}

#[rstest]
fn indented_root_line() {
    assert_eq!(strict_err("  42").kind, ErrorKind::Indentation);
    assert_eq!(decode_value("  42", &lenient()).unwrap(), json!(42));
}

// Anything strict mode accepts, lenient mode accepts with the same tree.
#[rstest]
#[case("a: 1\nb:\n  c: x")]
#[case("users[2]{id,name}:\n  1,Ada\n  2,Bob")]
#[case("items[3|]: a|b|c")]
#[case("items[1]:\n  - users[2]{id}:\n      1\n      2\n    ok: true")]
#[case("")]
fn strict_is_conservative(#[case] input: &str) {
    let strict_tree = decode_value(input, &strict()).unwrap();
    let lenient_tree = decode_value(input, &lenient()).unwrap();
    assert_eq!(strict_tree, lenient_tree);
}
