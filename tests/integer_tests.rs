use keymeta::integer::{parse_bounded, parse_hex_u16, parse_u16, parse_u8, parse_uint};
use keymeta::{FieldPath, IssueKind};
use rstest::rstest;
use serde_json::{json, Value};

fn path() -> FieldPath {
    FieldPath::root().key("vendorId")
}

#[rstest]
#[case(json!("0x01A2"), 418)]
#[case(json!("0x01a2"), 418)]
#[case(json!("0xFFFF"), 0xFFFF)]
#[case(json!("0x0000"), 0)]
#[case(json!(418), 418)]
#[case(json!(65535), 65535)]
fn test_hex_accepts(#[case] input: Value, #[case] expected: u16) {
    assert_eq!(parse_hex_u16(&input, &path()).unwrap(), expected);
}

#[rstest]
#[case(json!("0x1"), IssueKind::Format)]
#[case(json!("0xFFFFF"), IssueKind::Format)]
#[case(json!("1A2"), IssueKind::Format)]
#[case(json!("0X01A2"), IssueKind::Format)]
#[case(json!("0x01G2"), IssueKind::Format)]
#[case(json!(" 0x01A2"), IssueKind::Format)]
#[case(json!(65536), IssueKind::Range)]
#[case(json!(-1), IssueKind::Range)]
#[case(json!(true), IssueKind::Type)]
#[case(json!(null), IssueKind::Type)]
fn test_hex_rejects(#[case] input: Value, #[case] kind: IssueKind) {
    let report = parse_hex_u16(&input, &path()).unwrap_err();
    assert_eq!(report.len(), 1);
    let issue = &report.issues()[0];
    assert_eq!(issue.kind, kind);
    assert_eq!(issue.path.to_string(), "vendorId");
    assert_eq!(issue.input.as_ref(), Some(&input));
}

#[rstest]
#[case(1, 0, 1)]
#[case(4, 15, 15)]
#[case(8, 255, 255)]
#[case(16, 65535, 65535)]
fn test_uint_upper_bound_inclusive(#[case] bits: u32, #[case] value: u64, #[case] expected: u64) {
    assert_eq!(parse_uint(&json!(value), &path(), bits).unwrap(), expected);
}

#[test]
fn test_uint_past_bound_names_the_bound() {
    let report = parse_uint(&json!(16), &path(), 4).unwrap_err();
    let issue = &report.issues()[0];
    assert_eq!(issue.kind, IssueKind::Range);
    assert!(issue.message.contains("0 to 15"), "{}", issue.message);
}

#[test]
fn test_fractions_and_strings_are_type_errors() {
    assert!(parse_u8(&json!(1.5), &path()).unwrap_err().has_kind(IssueKind::Type));
    assert!(parse_u8(&json!("12"), &path()).unwrap_err().has_kind(IssueKind::Type));
    assert_eq!(parse_u16(&json!(300.0), &path()).unwrap(), 300);
}

#[test]
fn test_bounded_range() {
    assert_eq!(parse_bounded(&json!(1), &path(), 1, 8).unwrap(), 1);
    assert_eq!(parse_bounded(&json!(8), &path(), 1, 8).unwrap(), 8);
    assert!(parse_bounded(&json!(0), &path(), 1, 8).is_err());
    assert!(parse_bounded(&json!(9), &path(), 1, 8).is_err());
}
