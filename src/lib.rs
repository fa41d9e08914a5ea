pub mod api;
pub mod config;
pub mod consts;
pub mod demo;
pub mod error;
pub mod integer;
pub mod issue;
pub mod keycodes;
pub mod layout;
pub mod metadata;

pub use error::{KeymetaError, KmResult};
pub use issue::{FieldPath, Issue, IssueKind, Report, Validated};
pub use metadata::{normalize, KeyboardMetadata, Normalizer};
