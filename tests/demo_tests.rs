use keymeta::demo::{demo_document, demo_metadata};
use keymeta::keycodes::{mo, Keycode};
use keymeta::layout::Label;

#[test]
fn test_demo_validates() {
    let meta = demo_metadata().unwrap();
    assert_eq!(meta.name, "Mochiko39HE");
    assert_eq!(meta.vendor_id, 0x0108);
    assert_eq!(meta.product_id, 0x0110);
    assert!(meta.usb_high_speed);
    assert_eq!(meta.adc_resolution, 12);
    assert_eq!(meta.num_advanced_keys, 32);
}

#[test]
fn test_demo_resolves_every_keycode() {
    let meta = demo_metadata().unwrap();
    assert_eq!((meta.num_profiles, meta.num_layers, meta.num_keys), (4, 4, 39));
    assert_eq!(meta.total_keycodes(), 39 * 4 * 4);
    for profile in &meta.default_keymaps {
        assert_eq!(profile.len(), 4);
        assert!(profile.iter().all(|layer| layer.len() == 39));
    }
}

#[test]
fn test_demo_base_layer() {
    let meta = demo_metadata().unwrap();
    assert_eq!(meta.keycode(0, 0, 0), Some(Keycode::Q.code()));
    assert_eq!(meta.keycode(0, 0, 15), Some(Keycode::Escape.code()));
    assert_eq!(meta.keycode(0, 0, 34), mo(1));
    assert_eq!(meta.keycode(3, 0, 35), mo(2));
    assert_eq!(meta.keycode(2, 0, 38), Some(Keycode::RightCtrl.code()));
}

#[test]
fn test_demo_layout() {
    let meta = demo_metadata().unwrap();
    assert_eq!(meta.layout.labels, vec![Label::Toggle("default".into())]);
    let row_lengths: Vec<usize> = meta.layout.keymap.iter().map(Vec::len).collect();
    assert_eq!(row_lengths, vec![10, 11, 10, 8]);
    assert_eq!(meta.layout.key_count(), 39);
    assert_eq!(meta.layout.keymap[3][2].w, 2.25);
    assert_eq!(meta.layout.keymap[0][5].x, 1.5);
}

#[test]
fn test_demo_document_uses_per_profile_form() {
    let doc = demo_document().unwrap();
    assert!(doc.get("defaultKeymap").is_none());
    assert_eq!(doc["defaultKeymaps"].as_array().map(Vec::len), Some(4));
}
