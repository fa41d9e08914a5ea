//! The built-in demo keyboard: a 39-key split board with four profiles and four layers.

use crate::error::KmResult;
use crate::metadata::{normalize, KeyboardMetadata};
use serde_json::Value;

/// Raw demo document, in the same JSON shape users write.
pub const DEMO_DOCUMENT: &str = include_str!("../data/keyboards/mochiko39he.json");

pub fn demo_document() -> KmResult<Value> {
    Ok(serde_json::from_str(DEMO_DOCUMENT)?)
}

/// The demo document, validated with default limits.
pub fn demo_metadata() -> KmResult<KeyboardMetadata> {
    let doc = demo_document()?;
    Ok(normalize(&doc)?)
}
