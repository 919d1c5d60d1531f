use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use super::app::App;
use super::form::{Form, FormKind};
use super::navigator::PageId;
use super::notice::Notice;
use super::page::{Page, PageState};
use super::theme::Theme;

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = app.theme();
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let Some(page) = app.page() else {
        return;
    };

    draw_header(frame, chunks[0], page, &app.breadcrumb(), theme);
    match page.form() {
        Some(form) => draw_form(frame, chunks[1], page, form, theme),
        None => draw_rows(frame, chunks[1], page, theme),
    }
    draw_footer(frame, chunks[2], page, theme);

    if let Some(notice) = app.notice() {
        draw_notice(frame, area, notice, theme);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, page: &Page, trail: &[&str], theme: &Theme) {
    let mut spans = vec![Span::styled(trail.join(" › "), theme.title_style())];
    if !page.context().is_empty() {
        spans.push(Span::styled("  │  ", theme.dim_style()));
        spans.push(Span::raw(page.context().to_string()));
    }
    let status = match (page.state(), page.updated_at()) {
        (PageState::Loading, _) => "loading…".to_string(),
        (PageState::Failed(_), _) => "load failed".to_string(),
        (_, Some(at)) => format!("updated {}", at.format("%H:%M:%S")),
        (_, None) => String::new(),
    };
    if !status.is_empty() {
        spans.push(Span::styled(format!("  │  {status}"), theme.dim_style()));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(Span::styled(" cimon ", theme.title_style())),
    );
    frame.render_widget(header, area);
}

fn draw_rows(frame: &mut Frame, area: Rect, page: &Page, theme: &Theme) {
    let items: Vec<ListItem> = page
        .rows()
        .iter()
        .map(|row| ListItem::new(Line::from(Span::styled(row.label.clone(), theme.row_style(row.hint)))))
        .collect();

    let selectable = page.selected_reference().is_selectable();
    let highlight = if selectable {
        theme.selection_style()
    } else {
        theme.dim_style()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(false))
                .title(format!(" {} ", page.id().title())),
        )
        .highlight_style(highlight)
        .highlight_symbol(if selectable { "▶ " } else { "  " });

    let mut state = ListState::default();
    state.select(page.cursor());
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_form(frame: &mut Frame, area: Rect, page: &Page, form: &Form, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form.fields().len() as u16 * 3),
            Constraint::Min(0),
        ])
        .split(area);

    let field_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); form.fields().len()])
        .split(chunks[0]);

    for (i, (field, field_area)) in form.fields().iter().zip(field_areas.iter()).enumerate() {
        let focused = i == form.focus();
        let mut value = field.display();
        if focused {
            value.push('▏');
        }
        let input = Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(focused))
                .title(format!(" {} ", field.label)),
        );
        frame.render_widget(input, *field_area);
    }

    if !page.rows().is_empty() {
        draw_rows(frame, chunks[1], page, theme);
    }
}

fn draw_footer(frame: &mut Frame, area: Rect, page: &Page, theme: &Theme) {
    let hints: &[(&str, &str)] = if let Some(form) = page.form() {
        match form.kind() {
            FormKind::AddProject => &[
                ("Tab", "next field"),
                ("Enter", "save project"),
                ("Esc", "cancel"),
            ],
            FormKind::AddToken => &[("Enter", "save token"), ("Esc", "cancel")],
        }
    } else if page.id() == PageId::Home || page.id() == PageId::Workflows {
        &[("↑↓", "move"), ("Enter", "open"), ("r", "refresh"), ("q", "quit")]
    } else {
        &[("↑↓", "move"), ("Enter", "open"), ("r", "refresh"), ("b", "back")]
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(
            format!(" {key} "),
            theme.key_hint_style().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(format!("{label}  "), theme.dim_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_notice(frame: &mut Frame, area: Rect, notice: &Notice, theme: &Theme) {
    let width = (notice.message.chars().count() as u16 + 6).min(area.width);
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(4),
        width,
        height: 3.min(area.height),
    };

    let body = Paragraph::new(Span::styled(notice.message.clone(), theme.notice_style(notice.level)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.notice_style(notice.level)),
        );
    frame.render_widget(Clear, rect);
    frame.render_widget(body, rect);
}
