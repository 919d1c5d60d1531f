use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::model::Status;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

pub fn status_cell(status: Status) -> Cell {
    let cell = Cell::new(format!("{} {status}", status.emoji()));
    match status {
        Status::Success => cell.fg(TableColor::Green),
        Status::Failed => cell.fg(TableColor::Red),
        Status::Running => cell.fg(TableColor::Cyan),
        Status::Pending => cell.fg(TableColor::Yellow),
        Status::Manual => cell.fg(TableColor::Magenta),
        Status::Canceled | Status::Skipped => cell.fg(TableColor::DarkGrey),
        Status::Unknown => cell,
    }
}
