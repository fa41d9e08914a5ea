//! The keyboard metadata document and its normalizer.
//!
//! [`Normalizer::normalize`] is the entry point: it checks every field, validates the
//! layout, resolves both accepted forms of default keymap data into one
//! `[profile][layer][key]` array, and returns either the canonical
//! [`KeyboardMetadata`] or every issue it found.

use crate::config::FirmwareLimits;
use crate::consts::ADC_RESOLUTION_MAX;
use crate::integer::{parse_bounded, parse_hex_u16};
use crate::issue::{FieldPath, Issue, IssueKind, Report, Validated};
use crate::keycodes::{builtin_registry, resolve_keycode, Keycode, KeycodeRegistry};
use crate::layout::{validate_layout, Layout};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Resolved keycodes indexed `[profile][layer][key]`.
pub type DefaultKeymaps = Vec<Vec<Vec<u8>>>;

/// A fully validated keyboard description. Only [`Normalizer`] constructs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardMetadata {
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub usb_high_speed: bool,

    pub adc_resolution: u8,
    pub num_profiles: usize,
    pub num_layers: usize,
    pub num_keys: usize,
    pub num_advanced_keys: usize,

    pub layout: Layout,
    pub default_keymaps: DefaultKeymaps,
}

impl KeyboardMetadata {
    pub fn keycode(&self, profile: usize, layer: usize, key: usize) -> Option<u8> {
        self.default_keymaps
            .get(profile)?
            .get(layer)?
            .get(key)
            .copied()
    }

    /// `numProfiles × numLayers × numKeys`.
    pub fn total_keycodes(&self) -> usize {
        self.default_keymaps
            .iter()
            .flatten()
            .map(Vec::len)
            .sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The declared counts, each present only if it validated.
#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    profiles: Option<usize>,
    layers: Option<usize>,
    keys: Option<usize>,
    advanced_keys: Option<usize>,
}

/// Which of the two keymap forms the document used.
#[derive(Debug, Clone, Copy)]
enum DefaultKeymapSource<'v> {
    /// `defaultKeymap`: one profile's layers, copied into every profile.
    Single(&'v Value),
    /// `defaultKeymaps`: every profile spelled out.
    PerProfile(&'v Value),
    Both {
        single: &'v Value,
        per_profile: &'v Value,
    },
    Missing,
}

impl<'v> DefaultKeymapSource<'v> {
    fn select(obj: &'v Map<String, Value>) -> Self {
        match (present(obj, SINGLE_FIELD), present(obj, PER_PROFILE_FIELD)) {
            (Some(v), None) => Self::Single(v),
            (None, Some(v)) => Self::PerProfile(v),
            (Some(single), Some(per_profile)) => Self::Both { single, per_profile },
            (None, None) => Self::Missing,
        }
    }
}

const SINGLE_FIELD: &str = "defaultKeymap";
const PER_PROFILE_FIELD: &str = "defaultKeymaps";

/// A layer grid where layers that were not arrays are `None`.
type LayerGrid = Vec<Option<Vec<u8>>>;

pub struct Normalizer<'a> {
    limits: &'a FirmwareLimits,
    registry: &'a KeycodeRegistry,
}

impl<'a> Normalizer<'a> {
    pub fn new(limits: &'a FirmwareLimits, registry: &'a KeycodeRegistry) -> Self {
        Self { limits, registry }
    }

    pub fn normalize(&self, doc: &Value) -> Validated<KeyboardMetadata> {
        let root = FieldPath::root();
        let Value::Object(obj) = doc else {
            return Err(Report::single(Issue::type_mismatch(&root, "an object", doc)));
        };

        let mut report = Report::new();

        // 1. Scalars
        let name = report.absorb(required(obj, "name", &root).and_then(|v| parse_name(v, &root.key("name"))));
        let vendor_id = report.absorb(
            required(obj, "vendorId", &root).and_then(|v| parse_hex_u16(v, &root.key("vendorId"))),
        );
        let product_id = report.absorb(
            required(obj, "productId", &root).and_then(|v| parse_hex_u16(v, &root.key("productId"))),
        );
        let usb_high_speed = report.absorb(parse_flag(obj, "usbHighSpeed", &root));
        let adc_resolution = report.absorb(
            self.bounded(obj, "adcResolution", ADC_RESOLUTION_MAX as usize, &root)
                .map(|n| n as u8),
        );
        let counts = Counts {
            profiles: report.absorb(self.bounded(obj, "numProfiles", self.limits.max_profiles, &root)),
            layers: report.absorb(self.bounded(obj, "numLayers", self.limits.max_layers, &root)),
            keys: report.absorb(self.bounded(obj, "numKeys", self.limits.max_keys, &root)),
            advanced_keys: report.absorb(self.bounded(
                obj,
                "numAdvancedKeys",
                self.limits.max_advanced_keys,
                &root,
            )),
        };

        // 2. Layout
        let layout = report.absorb(
            required(obj, "layout", &root).and_then(|v| validate_layout(v, &root.key("layout"))),
        );
        if let (Some(layout), Some(num_keys)) = (&layout, counts.keys) {
            check_key_indices(layout, num_keys, &root.key("layout").key("keymap"), &mut report);
        }

        // 3 + 4. Default keymaps
        let default_keymaps = self.reconcile_keymaps(obj, &root, counts, &mut report);

        debug!(
            "Normalized '{}' with {} issue(s)",
            name.as_deref().unwrap_or("<unnamed>"),
            report.len()
        );

        let (
            Some(name),
            Some(vendor_id),
            Some(product_id),
            Some(usb_high_speed),
            Some(adc_resolution),
            Some(num_profiles),
            Some(num_layers),
            Some(num_keys),
            Some(num_advanced_keys),
            Some(layout),
            Some(default_keymaps),
        ) = (
            name,
            vendor_id,
            product_id,
            usb_high_speed,
            adc_resolution,
            counts.profiles,
            counts.layers,
            counts.keys,
            counts.advanced_keys,
            layout,
            default_keymaps,
        )
        else {
            return Err(report);
        };

        report.finish(KeyboardMetadata {
            name,
            vendor_id,
            product_id,
            usb_high_speed,
            adc_resolution,
            num_profiles,
            num_layers,
            num_keys,
            num_advanced_keys,
            layout,
            default_keymaps,
        })
    }

    fn bounded(
        &self,
        obj: &Map<String, Value>,
        field: &str,
        max: usize,
        root: &FieldPath,
    ) -> Validated<usize> {
        let value = required(obj, field, root)?;
        parse_bounded(value, &root.key(field), 1, max as i128).map(|n| n as usize)
    }

    fn reconcile_keymaps(
        &self,
        obj: &Map<String, Value>,
        root: &FieldPath,
        counts: Counts,
        report: &mut Report,
    ) -> Option<DefaultKeymaps> {
        match DefaultKeymapSource::select(obj) {
            DefaultKeymapSource::Single(v) => {
                self.resolve_single(v, &root.key(SINGLE_FIELD), counts, report)
            }
            DefaultKeymapSource::PerProfile(v) => {
                self.resolve_per_profile(v, &root.key(PER_PROFILE_FIELD), counts, report)
            }
            DefaultKeymapSource::Missing => {
                report.push(Issue::new(
                    IssueKind::Shape,
                    root,
                    "missing default keymap: expected either defaultKeymap or defaultKeymaps",
                ));
                None
            }
            DefaultKeymapSource::Both { single, per_profile } => {
                warn!("Document supplies both {} and {}", SINGLE_FIELD, PER_PROFILE_FIELD);
                report.push(Issue::new(
                    IssueKind::Shape,
                    root,
                    "ambiguous default keymap: supply either defaultKeymap or defaultKeymaps, not both",
                ));
                // Both are still resolved so their own problems surface too.
                self.resolve_single(single, &root.key(SINGLE_FIELD), counts, report);
                self.resolve_per_profile(per_profile, &root.key(PER_PROFILE_FIELD), counts, report);
                None
            }
        }
    }

    /// Resolves `defaultKeymap` and copies it into every profile.
    fn resolve_single(
        &self,
        value: &Value,
        path: &FieldPath,
        counts: Counts,
        report: &mut Report,
    ) -> Option<DefaultKeymaps> {
        let layers = self.resolve_layers(value, path, report)?;
        check_layers(&layers, path, counts, report);

        let num_profiles = counts.profiles?;
        let layers: Vec<Vec<u8>> = layers.into_iter().map(Option::unwrap_or_default).collect();
        // Each profile owns its copy.
        Some((0..num_profiles).map(|_| layers.clone()).collect())
    }

    fn resolve_per_profile(
        &self,
        value: &Value,
        path: &FieldPath,
        counts: Counts,
        report: &mut Report,
    ) -> Option<DefaultKeymaps> {
        let Value::Array(profiles) = value else {
            report.push(Issue::type_mismatch(path, "an array of profiles", value));
            return None;
        };

        if let Some(expected) = counts.profiles {
            if profiles.len() != expected {
                report.push(
                    Issue::new(
                        IssueKind::Shape,
                        path,
                        format!(
                            "expected {} to have {} profiles, found {}",
                            PER_PROFILE_FIELD,
                            expected,
                            profiles.len()
                        ),
                    )
                    .with_input(Value::from(profiles.len())),
                );
            }
        }

        let mut keymaps = Vec::with_capacity(profiles.len());
        for (p, profile) in profiles.iter().enumerate() {
            let profile_path = path.index(p);
            let layers = self.resolve_layers(profile, &profile_path, report);
            if let Some(layers) = &layers {
                check_layers(layers, &profile_path, counts, report);
            }
            keymaps.push(
                layers
                    .unwrap_or_default()
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
            );
        }
        Some(keymaps)
    }

    /// Resolves a `[layer][key]` grid. Entries that fail resolution are reported and
    /// held as `KC_NO`; the report is then non-empty so they never reach the output.
    fn resolve_layers(&self, value: &Value, path: &FieldPath, report: &mut Report) -> Option<LayerGrid> {
        let Value::Array(layers) = value else {
            report.push(Issue::type_mismatch(path, "an array of layers", value));
            return None;
        };

        let grid = layers
            .iter()
            .enumerate()
            .map(|(l, layer)| {
                let layer_path = path.index(l);
                let Value::Array(entries) = layer else {
                    report.push(Issue::type_mismatch(&layer_path, "an array of keycodes", layer));
                    return None;
                };
                let codes: Vec<u8> = entries
                    .iter()
                    .enumerate()
                    .map(|(k, entry)| {
                        report
                            .absorb(resolve_keycode(entry, &layer_path.index(k), self.registry))
                            .unwrap_or(Keycode::No.code())
                    })
                    .collect();
                Some(codes)
            })
            .collect();
        Some(grid)
    }
}

/// Validates with the default firmware limits and the built-in keycode table.
pub fn normalize(doc: &Value) -> Validated<KeyboardMetadata> {
    let limits = FirmwareLimits::default();
    Normalizer::new(&limits, builtin_registry()).normalize(doc)
}

/// Layer count must equal `numLayers`; each layer's key count must equal `numKeys`.
fn check_layers(layers: &LayerGrid, path: &FieldPath, counts: Counts, report: &mut Report) {
    if let Some(expected) = counts.layers {
        if layers.len() != expected {
            report.push(
                Issue::new(
                    IssueKind::Shape,
                    path,
                    format!("expected {} layers, found {}", expected, layers.len()),
                )
                .with_input(Value::from(layers.len())),
            );
        }
    }

    let Some(expected) = counts.keys else {
        return;
    };
    for (l, layer) in layers.iter().enumerate() {
        let Some(layer) = layer else { continue };
        if layer.len() != expected {
            report.push(
                Issue::new(
                    IssueKind::Shape,
                    &path.index(l),
                    format!("expected {} keys, found {}", expected, layer.len()),
                )
                .with_input(Value::from(layer.len())),
            );
        }
    }
}

/// Every layout key must point inside the keymap arrays.
fn check_key_indices(layout: &Layout, num_keys: usize, path: &FieldPath, report: &mut Report) {
    for ((r, c), descriptor) in layout.descriptors() {
        if usize::from(descriptor.key) >= num_keys {
            report.push(
                Issue::new(
                    IssueKind::Referential,
                    &path.index(r).index(c).key("key"),
                    format!(
                        "key {} is out of range, numKeys is {}",
                        descriptor.key, num_keys
                    ),
                )
                .with_input(Value::from(descriptor.key)),
            );
        }
    }
}

fn present<'v>(obj: &'v Map<String, Value>, field: &str) -> Option<&'v Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn required<'v>(obj: &'v Map<String, Value>, field: &str, root: &FieldPath) -> Validated<&'v Value> {
    present(obj, field).ok_or_else(|| Report::single(Issue::missing(&root.key(field))))
}

fn parse_name(value: &Value, path: &FieldPath) -> Validated<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::String(_) => Err(Report::single(
            Issue::new(IssueKind::Format, path, "name must not be empty").with_input(value.clone()),
        )),
        other => Err(Report::single(Issue::type_mismatch(path, "a string", other))),
    }
}

fn parse_flag(obj: &Map<String, Value>, field: &str, root: &FieldPath) -> Validated<bool> {
    match present(obj, field) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(Report::single(Issue::type_mismatch(
            &root.key(field),
            "a boolean",
            other,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tiny() -> Value {
        json!({
            "name": "tiny",
            "vendorId": "0x0001",
            "productId": 2,
            "adcResolution": 12,
            "numProfiles": 2,
            "numLayers": 1,
            "numKeys": 2,
            "numAdvancedKeys": 1,
            "layout": { "keymap": [[{ "key": 0 }, { "key": 1 }]] },
            "defaultKeymap": [["KC_A", "MO(1)"]]
        })
    }

    #[test]
    fn test_single_keymap_replicates() {
        let meta = normalize(&tiny()).unwrap();
        assert_eq!(meta.default_keymaps.len(), 2);
        assert_eq!(meta.default_keymaps[0], meta.default_keymaps[1]);
        assert_eq!(meta.keycode(1, 0, 1), Some(0xC1));
        assert!(!meta.usb_high_speed);
    }

    #[test]
    fn test_non_object_document() {
        let report = normalize(&json!([1, 2])).unwrap_err();
        assert_eq!(report.len(), 1);
        assert!(report.has_kind(IssueKind::Type));
    }

    #[test]
    fn test_layout_key_past_num_keys() {
        let mut doc = tiny();
        doc["layout"]["keymap"][0][1]["key"] = json!(5);
        let report = normalize(&doc).unwrap_err();
        assert_eq!(report.at("layout.keymap[0][1].key").count(), 1);
    }
}
