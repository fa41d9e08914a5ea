use criterion::{criterion_group, criterion_main, Criterion};
use keymeta::demo::demo_document;
use keymeta::keycodes::{builtin_registry, resolve_keycode};
use keymeta::{normalize, FieldPath};
use serde_json::json;
use std::hint::black_box;

fn bench_normalize(c: &mut Criterion) {
    let doc = demo_document().expect("demo document parses");

    c.bench_function("normalize_demo", |b| {
        b.iter(|| normalize(black_box(&doc)).is_ok())
    });

    let mut single = doc.clone();
    if let Some(obj) = single.as_object_mut() {
        let keymaps = obj.remove("defaultKeymaps");
        let first = keymaps.and_then(|k| k.get(0).cloned());
        obj.insert("defaultKeymap".to_string(), first.unwrap_or_default());
    }
    c.bench_function("normalize_demo_single_keymap", |b| {
        b.iter(|| normalize(black_box(&single)).is_ok())
    });
}

fn bench_resolve(c: &mut Criterion) {
    let registry = builtin_registry();
    let path = FieldPath::root();
    let tokens = [json!("KC_ESC"), json!("MO(3)"), json!(42), json!("KC_NOPE")];

    c.bench_function("resolve_keycode", |b| {
        b.iter(|| {
            for token in &tokens {
                let _ = black_box(resolve_keycode(black_box(token), &path, registry));
            }
        })
    });
}

criterion_group!(benches, bench_normalize, bench_resolve);
criterion_main!(benches);
