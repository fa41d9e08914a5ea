//! Physical layout: the label/option table and the grid of key descriptors.

use crate::consts::{MIN_CHOICE_OPTIONS, TOGGLE_OPTION_COUNT};
use crate::integer::{parse_u8, read_integer};
use crate::issue::{FieldPath, Issue, IssueKind, Report, Validated};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// A named axis of layout variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    /// A single name, toggled on or off.
    Toggle(String),
    /// An ordered list of at least three named values.
    Choice(Vec<String>),
}

impl Label {
    /// Number of selectable option values.
    pub fn option_count(&self) -> usize {
        match self {
            Self::Toggle(_) => TOGGLE_OPTION_COUNT,
            Self::Choice(values) => values.len(),
        }
    }
}

/// `[label_index, option_index]` in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct OptionRef {
    pub label: usize,
    pub value: usize,
}

impl From<(usize, usize)> for OptionRef {
    fn from((label, value): (usize, usize)) -> Self {
        Self { label, value }
    }
}

impl From<OptionRef> for (usize, usize) {
    fn from(r: OptionRef) -> Self {
        (r.label, r.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    pub key: u8,
    pub w: f64,
    pub h: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<OptionRef>,
}

impl KeyDescriptor {
    pub fn new(key: u8) -> Self {
        Self {
            key,
            w: 1.0,
            h: 1.0,
            x: 0.0,
            y: 0.0,
            option: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    pub labels: Vec<Label>,
    pub keymap: Vec<Vec<KeyDescriptor>>,
}

impl Layout {
    /// Descriptors in row-major order with their `(row, column)` position.
    pub fn descriptors(&self) -> impl Iterator<Item = ((usize, usize), &KeyDescriptor)> {
        self.keymap.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, descriptor)| ((r, c), descriptor))
        })
    }

    pub fn key_count(&self) -> usize {
        self.keymap.iter().map(Vec::len).sum()
    }

    /// Checks an option reference against the label table.
    pub fn check_option(&self, option: OptionRef) -> Result<(), String> {
        check_option(option, self.labels.len(), |i| {
            self.labels.get(i).map(Label::option_count)
        })
    }
}

fn check_option(
    option: OptionRef,
    label_count: usize,
    option_count: impl Fn(usize) -> Option<usize>,
) -> Result<(), String> {
    let OptionRef { label, value } = option;
    if label >= label_count {
        return Err(format!(
            "option ({}, {}) is out of range: label {} does not exist ({} defined)",
            label, value, label, label_count
        ));
    }
    match option_count(label) {
        Some(count) if value >= count => Err(format!(
            "option ({}, {}) is out of range: label {} has {} values",
            label, value, label, count
        )),
        _ => Ok(()),
    }
}

/// Validates the `layout` field of a metadata document.
pub fn validate_layout(value: &Value, path: &FieldPath) -> Validated<Layout> {
    let Value::Object(obj) = value else {
        return Err(Report::single(Issue::type_mismatch(path, "an object", value)));
    };

    let mut report = Report::new();
    let labels = parse_labels(obj, &path.key("labels"), &mut report);
    let keymap = parse_keymap(obj, &path.key("keymap"), &mut report);

    // Entries that failed to parse keep their slot so indices in paths stay aligned.
    if let (Some(labels), Some(keymap)) = (&labels, &keymap) {
        let keymap_path = path.key("keymap");
        for (r, row) in keymap.iter().enumerate() {
            for (c, descriptor) in row.iter().enumerate() {
                let Some(option) = descriptor.as_ref().and_then(|d| d.option) else {
                    continue;
                };
                let option_count = |i: usize| labels[i].as_ref().map(Label::option_count);
                if let Err(message) = check_option(option, labels.len(), option_count) {
                    report.push(
                        Issue::new(
                            IssueKind::Referential,
                            &keymap_path.index(r).index(c).key("option"),
                            message,
                        )
                        .with_input(serde_json::json!([option.label, option.value])),
                    );
                }
            }
        }
    }

    debug!("Layout checked with {} issue(s)", report.len());

    let (Some(labels), Some(keymap)) = (labels, keymap) else {
        return Err(report);
    };
    report.finish(Layout {
        labels: labels.into_iter().flatten().collect(),
        keymap: keymap
            .into_iter()
            .map(|row| row.into_iter().flatten().collect())
            .collect(),
    })
}

fn parse_labels(
    obj: &Map<String, Value>,
    path: &FieldPath,
    report: &mut Report,
) -> Option<Vec<Option<Label>>> {
    let entries = match obj.get("labels") {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            report.push(Issue::type_mismatch(path, "an array", other));
            return None;
        }
    };

    Some(
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| report.absorb(parse_label(entry, &path.index(i))))
            .collect(),
    )
}

fn parse_label(value: &Value, path: &FieldPath) -> Validated<Label> {
    match value {
        Value::String(name) => Ok(Label::Toggle(name.clone())),
        Value::Array(values) => {
            let mut report = Report::new();
            let names: Vec<String> = values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| match v {
                    Value::String(s) => Some(s.clone()),
                    other => {
                        report.push(Issue::type_mismatch(&path.index(i), "a string", other));
                        None
                    }
                })
                .collect();
            if values.len() < MIN_CHOICE_OPTIONS {
                report.push(
                    Issue::new(
                        IssueKind::Shape,
                        path,
                        format!(
                            "a multi-valued label needs at least {} values, found {}",
                            MIN_CHOICE_OPTIONS,
                            values.len()
                        ),
                    )
                    .with_input(value.clone()),
                );
            }
            report.finish(Label::Choice(names))
        }
        other => Err(Report::single(Issue::type_mismatch(
            path,
            "a string or an array of strings",
            other,
        ))),
    }
}

fn parse_keymap(
    obj: &Map<String, Value>,
    path: &FieldPath,
    report: &mut Report,
) -> Option<Vec<Vec<Option<KeyDescriptor>>>> {
    let rows = match obj.get("keymap") {
        None => {
            report.push(Issue::missing(path));
            return None;
        }
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            report.push(Issue::type_mismatch(path, "an array of rows", other));
            return None;
        }
    };

    let mut keymap = Vec::with_capacity(rows.len());
    for (r, row) in rows.iter().enumerate() {
        let row_path = path.index(r);
        let Value::Array(cells) = row else {
            report.push(Issue::type_mismatch(&row_path, "an array of keys", row));
            keymap.push(Vec::new());
            continue;
        };
        keymap.push(
            cells
                .iter()
                .enumerate()
                .map(|(c, cell)| report.absorb(parse_descriptor(cell, &row_path.index(c))))
                .collect(),
        );
    }
    Some(keymap)
}

fn parse_descriptor(value: &Value, path: &FieldPath) -> Validated<KeyDescriptor> {
    let Value::Object(obj) = value else {
        return Err(Report::single(Issue::type_mismatch(path, "an object", value)));
    };

    let mut report = Report::new();
    let key = match obj.get("key") {
        Some(v) => report.absorb(parse_u8(v, &path.key("key"))),
        None => {
            report.push(Issue::missing(&path.key("key")));
            None
        }
    };
    let w = report.absorb(parse_extent(obj, "w", path));
    let h = report.absorb(parse_extent(obj, "h", path));
    let x = report.absorb(parse_offset(obj, "x", path));
    let y = report.absorb(parse_offset(obj, "y", path));
    let option = report.absorb(parse_option(obj, path));

    match (key, w, h, x, y, option) {
        (Some(key), Some(w), Some(h), Some(x), Some(y), Some(option)) => report.finish(KeyDescriptor {
            key,
            w,
            h,
            x,
            y,
            option,
        }),
        _ => Err(report),
    }
}

fn read_number(obj: &Map<String, Value>, field: &str, path: &FieldPath, default: f64) -> Validated<f64> {
    match obj.get(field) {
        None => Ok(default),
        Some(value) => value.as_f64().filter(|f| f.is_finite()).ok_or_else(|| {
            Report::single(Issue::type_mismatch(&path.key(field), "a number", value))
        }),
    }
}

/// `w` and `h`: default 1, never below 1.
fn parse_extent(obj: &Map<String, Value>, field: &str, path: &FieldPath) -> Validated<f64> {
    let n = read_number(obj, field, path, 1.0)?;
    if n < 1.0 {
        return Err(Report::single(
            Issue::new(
                IssueKind::Range,
                &path.key(field),
                format!("{} must be at least 1, found {}", field, n),
            )
            .with_input(Value::from(n)),
        ));
    }
    Ok(n)
}

/// `x` and `y`: default 0, unbounded so mirrored layouts can shift left or up.
fn parse_offset(obj: &Map<String, Value>, field: &str, path: &FieldPath) -> Validated<f64> {
    read_number(obj, field, path, 0.0)
}

fn parse_option(obj: &Map<String, Value>, path: &FieldPath) -> Validated<Option<OptionRef>> {
    let path = path.key("option");
    let pair = match obj.get("option") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(pair)) if pair.len() == 2 => pair,
        Some(other) => {
            return Err(Report::single(Issue::type_mismatch(
                &path,
                "a [label, value] pair",
                other,
            )));
        }
    };

    let mut report = Report::new();
    let mut index = |i: usize| -> Option<usize> {
        let n = report.absorb(read_integer(&pair[i], &path.index(i)))?;
        if n < 0 {
            report.push(
                Issue::new(
                    IssueKind::Range,
                    &path.index(i),
                    format!("{} must not be negative", n),
                )
                .with_input(pair[i].clone()),
            );
            return None;
        }
        usize::try_from(n).ok()
    };
    let label = index(0);
    let value = index(1);
    match (label, value) {
        (Some(label), Some(value)) => report.finish(Some(OptionRef { label, value })),
        _ => Err(report),
    }
}
