//! Colour palette and style helpers for the navigator.
//!
//! A `Theme` is built once at startup and handed to the renderer by
//! reference; nothing mutates it afterwards.

use ratatui::style::{Color, Modifier, Style};

use crate::model::Status;
use crate::rows::StyleHint;

use super::notice::NoticeLevel;

#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    pub panel_border: Color,
    /// Primary text color
    pub text: Color,
    /// Dimmed text (secondary info)
    pub text_dim: Color,
    /// Muted text (separators, skipped work)
    pub text_muted: Color,
    /// Accent color (titles, running work)
    pub accent: Color,
    pub success: Color,
    pub warn: Color,
    pub error: Color,
    pub info: Color,
    /// Manual jobs
    pub purple: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub key_hint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            panel_border: Color::Rgb(60, 60, 60),
            text: Color::Rgb(212, 212, 212),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(79, 193, 255),
            success: Color::Rgb(78, 201, 176),
            warn: Color::Rgb(220, 180, 100),
            error: Color::Rgb(244, 135, 113),
            info: Color::Rgb(156, 220, 254),
            purple: Color::Rgb(197, 134, 192),
            selection_bg: Color::Rgb(38, 79, 120),
            selection_fg: Color::White,
            key_hint: Color::Rgb(206, 145, 120),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn status_color(&self, status: Status) -> Color {
        match status {
            Status::Success => self.palette.success,
            Status::Failed => self.palette.error,
            Status::Running => self.palette.accent,
            Status::Pending => self.palette.warn,
            Status::Canceled => self.palette.text_dim,
            Status::Skipped => self.palette.text_muted,
            Status::Manual => self.palette.purple,
            Status::Unknown => self.palette.text,
        }
    }

    pub fn row_style(&self, hint: StyleHint) -> Style {
        match hint {
            StyleHint::Title => Style::default()
                .fg(self.palette.accent)
                .add_modifier(Modifier::BOLD),
            StyleHint::Separator | StyleHint::Muted => Style::default().fg(self.palette.text_muted),
            StyleHint::Text => Style::default().fg(self.palette.text),
            StyleHint::Accent => Style::default().fg(self.palette.info),
            StyleHint::Loading => Style::default()
                .fg(self.palette.warn)
                .add_modifier(Modifier::ITALIC),
            StyleHint::Error => Style::default().fg(self.palette.error),
            StyleHint::Status(status) => Style::default().fg(self.status_color(status)),
        }
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.palette.selection_bg)
            .fg(self.palette.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.palette.accent)
        } else {
            Style::default().fg(self.palette.panel_border)
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.palette.text_dim)
    }

    pub fn key_hint_style(&self) -> Style {
        Style::default().fg(self.palette.key_hint)
    }

    pub fn notice_style(&self, level: NoticeLevel) -> Style {
        let color = match level {
            NoticeLevel::Info => self.palette.info,
            NoticeLevel::Success => self.palette.success,
            NoticeLevel::Warn => self.palette.warn,
            NoticeLevel::Error => self.palette.error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}
