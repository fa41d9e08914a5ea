use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keymeta::api::FileOutcome;
use keymeta::consts::PARAM_SLOTS;
use keymeta::issue::{IssueKind, Report};
use keymeta::keycodes::{KeycodeRegistry, ParamKind};
use keymeta::KeyboardMetadata;

fn kind_color(kind: IssueKind) -> Color {
    match kind {
        IssueKind::Missing | IssueKind::Type => Color::Red,
        IssueKind::Range | IssueKind::Format => Color::Yellow,
        IssueKind::UnknownSymbol => Color::Magenta,
        IssueKind::Referential | IssueKind::Shape => Color::Cyan,
    }
}

pub fn issues(file: &str, report: &Report) {
    println!("\n❌ {}: {}", file, report);
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Path").add_attribute(Attribute::Bold),
        Cell::new("Kind").add_attribute(Attribute::Bold),
        Cell::new("Message").add_attribute(Attribute::Bold),
        Cell::new("Input"),
    ]);

    for issue in report {
        let input = issue
            .input
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&issue.path),
            Cell::new(issue.kind).fg(kind_color(issue.kind)),
            Cell::new(&issue.message),
            Cell::new(input),
        ]);
    }
    println!("{}", table);
}

pub fn summary(outcomes: &[FileOutcome]) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    table.add_row(vec![
        Cell::new("File").add_attribute(Attribute::Bold),
        Cell::new("Result"),
        Cell::new("Issues"),
    ]);
    if let Some(col) = table.column_mut(2) {
        col.set_cell_alignment(CellAlignment::Right);
    }

    for outcome in outcomes {
        let (result, color, count) = match &outcome.result {
            Ok(_) => ("valid", Color::Green, 0),
            Err(e) => ("invalid", Color::Red, e.report().map_or(1, Report::len)),
        };
        table.add_row(vec![
            Cell::new(outcome.path.display()),
            Cell::new(result).fg(color),
            Cell::new(count),
        ]);
    }

    let valid = outcomes.iter().filter(|o| o.is_valid()).count();
    println!("\n{}", table);
    println!("{} of {} file(s) valid", valid, outcomes.len());
}

pub fn metadata(meta: &KeyboardMetadata) {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    let rows: [(&str, String); 9] = [
        ("Name", meta.name.clone()),
        ("Vendor ID", format!("0x{:04X}", meta.vendor_id)),
        ("Product ID", format!("0x{:04X}", meta.product_id)),
        ("USB High Speed", meta.usb_high_speed.to_string()),
        ("ADC Resolution", format!("{} bit", meta.adc_resolution)),
        ("Profiles", meta.num_profiles.to_string()),
        ("Layers", meta.num_layers.to_string()),
        ("Keys", meta.num_keys.to_string()),
        ("Advanced Keys", meta.num_advanced_keys.to_string()),
    ];
    for (field, value) in rows {
        table.add_row(vec![
            Cell::new(field).add_attribute(Attribute::Bold),
            Cell::new(value),
        ]);
    }
    println!("\n{}", table);
}

pub fn keycodes(registry: &KeycodeRegistry, filter: Option<&str>) {
    let filter = filter.map(str::to_uppercase);
    let matches = |name: &str| filter.as_ref().map_or(true, |f| name.to_uppercase().contains(f));

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Code").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Aliases"),
    ]);

    let mut shown = 0;
    for def in &registry.definitions {
        if !matches(&def.id) && !def.aliases.iter().any(|a| matches(a)) {
            continue;
        }
        table.add_row(vec![
            Cell::new(format!("0x{:02X}", def.code)),
            Cell::new(&def.id),
            Cell::new(def.aliases.join(", ")),
        ]);
        shown += 1;
    }

    for kind in [ParamKind::MomentaryLayer, ParamKind::Profile] {
        let name = format!("{}(n)", kind);
        if !matches(&name) {
            continue;
        }
        table.add_row(vec![
            Cell::new(format!(
                "0x{:02X}-0x{:02X}",
                kind.base(),
                kind.base() + PARAM_SLOTS - 1
            )),
            Cell::new(name).fg(Color::Cyan),
            Cell::new(format!("n in 0..{}", PARAM_SLOTS)),
        ]);
        shown += 1;
    }

    println!("{}", table);
    println!("{} keycode(s), table version {}", shown, registry.version);
}
