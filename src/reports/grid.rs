use comfy_table::presets::ASCII_FULL;
use comfy_table::{Cell, CellAlignment, Table};
use keymeta::keycodes::KeycodeRegistry;
use keymeta::KeyboardMetadata;

/// Draws one layer of a profile, arranged like the physical layout rows.
pub fn print_layer(meta: &KeyboardMetadata, profile: usize, layer: usize, registry: &KeycodeRegistry) {
    println!("\nProfile {} / Layer {}", profile, layer);
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    for row in &meta.layout.keymap {
        let cells: Vec<Cell> = row
            .iter()
            .map(|d| {
                let label = meta
                    .keycode(profile, layer, usize::from(d.key))
                    .map(|code| short_name(&registry.describe(code)))
                    .unwrap_or_default();
                Cell::new(label).set_alignment(CellAlignment::Center)
            })
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

fn short_name(name: &str) -> String {
    match name {
        "KC_NO" => String::new(),
        "KC_TRANSPARENT" => "▽".to_string(),
        _ => name.strip_prefix("KC_").unwrap_or(name).to_string(),
    }
}
