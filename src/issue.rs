//! Validation issues and the aggregated report returned by every validation stage.
//!
//! Stages never stop at the first problem: each one appends to a [`Report`] and
//! hands back `Result<T, Report>` so independent subtrees can be combined.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use strum_macros::Display;
use thiserror::Error;

/// Result of a validation stage.
pub type Validated<T> = Result<T, Report>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a value inside the input document, e.g. `layout.keymap[2][3].option`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Key(key.to_string()));
        next
    }

    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(Segment::Index(index));
        next
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "<document>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required field is absent.
    Missing,
    /// The value has the wrong JSON type.
    Type,
    /// A number lies outside its bit width or firmware maximum.
    Range,
    /// A string does not match its literal pattern.
    Format,
    /// A keycode mnemonic is not in the symbol table.
    UnknownSymbol,
    /// An index points outside the table it refers to.
    Referential,
    /// Array dimensions disagree with declared counts, or the keymap forms conflict.
    Shape,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub path: FieldPath,
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

impl Issue {
    pub fn new(kind: IssueKind, path: &FieldPath, message: impl Into<String>) -> Self {
        Self {
            path: path.clone(),
            kind,
            message: message.into(),
            input: None,
        }
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn missing(path: &FieldPath) -> Self {
        Self::new(IssueKind::Missing, path, "required field is missing")
    }

    pub fn type_mismatch(path: &FieldPath, expected: &str, found: &Value) -> Self {
        Self::new(
            IssueKind::Type,
            path,
            format!("expected {}, found {}", expected, json_kind(found)),
        )
        .with_input(found.clone())
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.kind, self.message)
    }
}

/// Every issue found in one validation pass, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Error)]
#[error("{} validation issue(s)", .issues.len())]
#[serde(transparent)]
pub struct Report {
    issues: Vec<Issue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: Report) {
        self.issues.extend(other.issues);
    }

    /// Folds a stage result into this report, keeping the value if there is one.
    pub fn absorb<T>(&mut self, result: Validated<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(report) => {
                self.merge(report);
                None
            }
        }
    }

    /// `Ok(value)` if nothing was reported, otherwise the report itself.
    pub fn finish<T>(self, value: T) -> Validated<T> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    pub fn has_kind(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    /// Issues whose path renders exactly as `path`.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues
            .iter()
            .filter(move |i| i.path.to_string() == path)
    }
}

impl IntoIterator for Report {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
