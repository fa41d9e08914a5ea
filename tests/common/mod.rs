#![allow(dead_code)]

use serde_json::{json, Value};

/// Builder for metadata documents. Starts from a valid board with one layout row
/// and a single `defaultKeymap` full of `KC_A`.
pub struct DocBuilder {
    doc: Value,
}

impl DocBuilder {
    pub fn new(profiles: usize, layers: usize, keys: usize) -> Self {
        let row: Vec<Value> = (0..keys).map(|k| json!({ "key": k })).collect();
        Self {
            doc: json!({
                "name": "Test Board",
                "vendorId": "0x1234",
                "productId": "0x5678",
                "usbHighSpeed": false,
                "adcResolution": 12,
                "numProfiles": profiles,
                "numLayers": layers,
                "numKeys": keys,
                "numAdvancedKeys": 8,
                "layout": { "labels": [], "keymap": [row] },
                "defaultKeymap": keymap(layers, keys, "KC_A"),
            }),
        }
    }

    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.doc[field] = value;
        self
    }

    pub fn remove(mut self, field: &str) -> Self {
        if let Some(obj) = self.doc.as_object_mut() {
            obj.remove(field);
        }
        self
    }

    pub fn labels(mut self, labels: Value) -> Self {
        self.doc["layout"]["labels"] = labels;
        self
    }

    /// Sets a field on the descriptor at `[0][index]`.
    pub fn descriptor(mut self, index: usize, field: &str, value: Value) -> Self {
        self.doc["layout"]["keymap"][0][index][field] = value;
        self
    }

    pub fn option(self, index: usize, label: usize, value: usize) -> Self {
        self.descriptor(index, "option", json!([label, value]))
    }

    /// Replaces the single form with `defaultKeymaps`.
    pub fn per_profile(self, keymaps: Value) -> Self {
        self.remove("defaultKeymap").set("defaultKeymaps", keymaps)
    }

    pub fn build(self) -> Value {
        self.doc
    }
}

/// A `[layer][key]` grid filled with one keycode name.
pub fn keymap(layers: usize, keys: usize, code: &str) -> Value {
    json!(vec![vec![code; keys]; layers])
}

/// `profiles` copies of [`keymap`].
pub fn keymaps(profiles: usize, layers: usize, keys: usize, code: &str) -> Value {
    json!(vec![keymap(layers, keys, code); profiles])
}
