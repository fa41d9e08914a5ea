use keymeta::layout::{validate_layout, Label, OptionRef};
use keymeta::{FieldPath, IssueKind};
use rstest::rstest;
use serde_json::{json, Value};

fn layout_path() -> FieldPath {
    FieldPath::root().key("layout")
}

/// One label with three values, one keyed descriptor carrying `option`.
fn with_option(labels: Value, option: Value) -> Value {
    json!({
        "labels": labels,
        "keymap": [[{ "key": 0 }, { "key": 1, "option": option }]]
    })
}

#[rstest]
#[case(json!([0, 0]))]
#[case(json!([0, 2]))]
fn test_choice_option_in_range(#[case] option: Value) {
    let doc = with_option(json!([["iso", "ansi", "jis"]]), option);
    let layout = validate_layout(&doc, &layout_path()).unwrap();
    assert_eq!(layout.labels[0].option_count(), 3);
}

#[rstest]
#[case(json!([0, 3]))]
#[case(json!([1, 0]))]
fn test_choice_option_out_of_range(#[case] option: Value) {
    let doc = with_option(json!([["iso", "ansi", "jis"]]), option.clone());
    let report = validate_layout(&doc, &layout_path()).unwrap_err();
    assert_eq!(report.len(), 1);
    let issue = &report.issues()[0];
    assert_eq!(issue.kind, IssueKind::Referential);
    assert_eq!(issue.path.to_string(), "layout.keymap[0][1].option");
    assert_eq!(issue.input.as_ref(), Some(&option));
}

#[rstest]
#[case(json!([0, 1]), true)]
#[case(json!([0, 2]), false)]
fn test_toggle_has_two_values(#[case] option: Value, #[case] ok: bool) {
    let doc = with_option(json!(["split backspace"]), option);
    assert_eq!(validate_layout(&doc, &layout_path()).is_ok(), ok);
}

#[test]
fn test_option_without_labels() {
    let doc = json!({ "keymap": [[{ "key": 0, "option": [0, 0] }]] });
    let report = validate_layout(&doc, &layout_path()).unwrap_err();
    assert!(report.has_kind(IssueKind::Referential));
}

#[test]
fn test_every_bad_reference_is_reported() {
    let doc = json!({
        "labels": ["a", ["x", "y", "z"]],
        "keymap": [
            [{ "key": 0, "option": [0, 2] }, { "key": 1, "option": [1, 2] }],
            [{ "key": 2, "option": [2, 0] }, { "key": 3, "option": [1, 5] }]
        ]
    });
    let report = validate_layout(&doc, &layout_path()).unwrap_err();
    let paths: Vec<String> = report.iter().map(|i| i.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "layout.keymap[0][0].option",
            "layout.keymap[1][0].option",
            "layout.keymap[1][1].option",
        ]
    );
}

#[test]
fn test_short_choice_label_is_a_shape_issue() {
    let doc = json!({ "labels": [["on", "off"]], "keymap": [] });
    let report = validate_layout(&doc, &layout_path()).unwrap_err();
    assert_eq!(report.issues()[0].kind, IssueKind::Shape);
    assert_eq!(report.issues()[0].path.to_string(), "layout.labels[0]");
}

#[test]
fn test_geometry_defaults_and_bounds() {
    let doc = json!({
        "keymap": [[
            { "key": 0, "w": 2.25, "x": -0.5, "y": 0.25 },
            { "key": 1, "w": 0.5 },
            { "key": 2, "h": "tall" }
        ]]
    });
    let report = validate_layout(&doc, &layout_path()).unwrap_err();
    assert_eq!(report.len(), 2);
    assert_eq!(report.at("layout.keymap[0][1].w").next().unwrap().kind, IssueKind::Range);
    assert_eq!(report.at("layout.keymap[0][2].h").next().unwrap().kind, IssueKind::Type);

    let ok = json!({ "keymap": [[{ "key": 0, "w": 2.25, "x": -0.5 }]] });
    let layout = validate_layout(&ok, &layout_path()).unwrap();
    let d = &layout.keymap[0][0];
    assert_eq!((d.w, d.h, d.x, d.y), (2.25, 1.0, -0.5, 0.0));
    assert_eq!(d.option, None);
}

#[rstest]
#[case(json!({ "keymap": [[{ "w": 1 }]] }), "layout.keymap[0][0].key", IssueKind::Missing)]
#[case(json!({ "keymap": [[{ "key": 256 }]] }), "layout.keymap[0][0].key", IssueKind::Range)]
#[case(json!({ "keymap": [[{ "key": 0, "option": [0] }]] }), "layout.keymap[0][0].option", IssueKind::Type)]
#[case(json!({ "keymap": [[{ "key": 0, "option": [0, -1] }]] }), "layout.keymap[0][0].option[1]", IssueKind::Range)]
#[case(json!({ "keymap": [[7]] }), "layout.keymap[0][0]", IssueKind::Type)]
#[case(json!({ "keymap": [{}] }), "layout.keymap[0]", IssueKind::Type)]
#[case(json!({ "keymap": "rows" }), "layout.keymap", IssueKind::Type)]
#[case(json!({ "labels": [3], "keymap": [] }), "layout.labels[0]", IssueKind::Type)]
#[case(json!({}), "layout.keymap", IssueKind::Missing)]
fn test_malformed_layouts(#[case] doc: Value, #[case] path: &str, #[case] kind: IssueKind) {
    let report = validate_layout(&doc, &layout_path()).unwrap_err();
    let issue = report.at(path).next().unwrap_or_else(|| panic!("no issue at {}: {:?}", path, report));
    assert_eq!(issue.kind, kind);
}

#[test]
fn test_layout_must_be_an_object() {
    let report = validate_layout(&json!([]), &layout_path()).unwrap_err();
    assert_eq!(report.issues()[0].path.to_string(), "layout");
}

#[test]
fn test_labels_round_trip_through_serde() {
    let doc = with_option(json!(["split", ["a", "b", "c"]]), json!([1, 2]));
    let layout = validate_layout(&doc, &layout_path()).unwrap();
    assert_eq!(layout.labels[0], Label::Toggle("split".into()));
    assert_eq!(layout.keymap[0][1].option, Some(OptionRef { label: 1, value: 2 }));
    assert_eq!(serde_json::to_value(&layout.labels).unwrap(), json!(["split", ["a", "b", "c"]]));
}
