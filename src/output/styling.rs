use console::{style, StyledObject};

use crate::model::Status;
use crate::rows::{Row, StyleHint};

/// Styling helpers for terminal output
pub fn bright_yellow(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn bright_green(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn bright_red(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn dim(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

pub fn status(text: impl std::fmt::Display, status: Status) -> StyledObject<String> {
    let styled = style(text.to_string());
    match status {
        Status::Success => styled.green(),
        Status::Failed => styled.red(),
        Status::Running => styled.cyan(),
        Status::Pending => styled.yellow(),
        Status::Manual => styled.magenta(),
        Status::Canceled | Status::Skipped => styled.dim(),
        Status::Unknown => styled,
    }
}

/// Console rendering of a row built for the interactive pages.
pub fn row(row: &Row) -> StyledObject<String> {
    match row.hint {
        StyleHint::Title => bright(&row.label).underlined(),
        StyleHint::Separator | StyleHint::Muted => dim(&row.label),
        StyleHint::Text => style(row.label.clone()),
        StyleHint::Accent => style(row.label.clone()).cyan(),
        StyleHint::Loading => bright_yellow(&row.label),
        StyleHint::Error => bright_red(&row.label),
        StyleHint::Status(s) => status(&row.label, s),
    }
}
