mod grid;
mod tables;

pub use self::grid::print_layer as print_layer_grid;
pub use self::tables::{
    issues as print_issue_table, keycodes as print_keycode_table, metadata as print_metadata,
    summary as print_summary,
};
