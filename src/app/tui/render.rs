use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, TableState, Wrap,
};

use crate::movies::{MovieRecord, truncate};

use super::form::{AddMovieForm, FormField};
use super::{Overlay, PendingDelete};

const ACCENT: Color = Color::Rgb(110, 170, 255);
const MUTED: Color = Color::Rgb(185, 195, 210);

#[allow(clippy::too_many_arguments)]
pub(super) fn draw_tui(
    frame: &mut Frame,
    movies: &[MovieRecord],
    table_state: &mut TableState,
    source: &str,
    fetch_label: &str,
    loading: bool,
    retrying: bool,
    error: Option<&str>,
    status: &str,
    overlay: Option<&Overlay>,
) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let state_color = if loading { Color::Yellow } else { MUTED };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "MOVIEDECK",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(format!("source {source}"), Style::default().fg(MUTED)),
        Span::styled("   ", Style::default()),
        Span::styled(format!("{} movies", movies.len()), Style::default().fg(MUTED)),
        Span::styled("   ", Style::default()),
        Span::styled(fetch_label.to_string(), Style::default().fg(state_color)),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Dashboard"));
    frame.render_widget(header, chunks[0]);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let rows: Vec<Row> = movies
        .iter()
        .map(|movie| {
            Row::new(vec![
                Cell::from(movie.title.clone()),
                Cell::from(movie.release_date.clone()),
                Cell::from(truncate(&movie.id, 22)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(52),
            Constraint::Length(12),
            Constraint::Min(8),
        ],
    )
    .header(
        Row::new(vec!["Title", "Release", "Id"])
            .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    )
    .block(panel_block("Movies"))
    .row_highlight_style(
        Style::default()
            .bg(ACCENT)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, body_chunks[0], table_state);

    let details_text = match (table_state.selected().and_then(|idx| movies.get(idx)), error) {
        (Some(movie), _) => format!(
            "Title\n{}\n\nReleased\n{}\n\nId\n{}\n\nOpening Text\n{}",
            movie.title,
            or_dash(&movie.release_date),
            movie.id,
            or_dash(movie.opening_text.trim()),
        ),
        (None, Some(message)) => format!("{message}\n\nPress f to fetch now."),
        (None, None) if loading => "Loading movies...".to_string(),
        (None, None) => "No movies to show.\n\nPress f to fetch or a to add one.".to_string(),
    };
    let details = Paragraph::new(details_text)
        .style(Style::default().fg(Color::Rgb(230, 230, 230)))
        .wrap(Wrap { trim: false })
        .block(panel_block("Details"));
    frame.render_widget(details, body_chunks[1]);

    let controls_text = if retrying {
        "↑/↓ move  f fetch  a add  d delete  c cancel retry  q quit"
    } else {
        "↑/↓ move  f fetch  a add  d delete  q quit"
    };
    let controls = Paragraph::new(Line::from(Span::styled(
        controls_text,
        Style::default().fg(MUTED),
    )))
    .alignment(Alignment::Center)
    .block(panel_block("Controls"));
    frame.render_widget(controls, chunks[2]);

    let status_widget = Paragraph::new(status.to_string())
        .style(status_style(status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, chunks[3]);

    match overlay {
        Some(Overlay::ConfirmDelete(pending)) => draw_confirm_delete(frame, pending),
        Some(Overlay::AddForm(form)) => draw_add_form(frame, form),
        None => {}
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn draw_confirm_delete(frame: &mut Frame, pending: &PendingDelete) {
    let popup_text = format!(
        "Delete movie?\n\n{}\n\n[y / Enter] Delete   [n / Esc] Cancel",
        truncate(&pending.title, 56)
    );
    let popup_area = popup_rect_for_text(frame.area(), &popup_text);
    render_popup_shadow(frame, popup_area);
    frame.render_widget(Clear, popup_area);
    let popup = Paragraph::new(popup_text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(modal_block("Confirm Delete"));
    frame.render_widget(popup, popup_area);
}

fn draw_add_form(frame: &mut Frame, form: &AddMovieForm) {
    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = form.focus() == field;
        let label_style = if focused {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(MUTED)
        };
        let marker = if focused { "▸ " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{marker}{}", field.label()),
            label_style,
        )));
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("  {}{cursor}", form.value(field)),
            Style::default().fg(Color::Rgb(230, 235, 242)),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "[Tab] next field   [Enter] add   [Esc] cancel",
        Style::default().fg(MUTED),
    )));

    let area = centered_fixed_rect(64, (lines.len() as u16).saturating_add(4), frame.area());
    render_popup_shadow(frame, area);
    frame.render_widget(Clear, area);
    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(modal_block("Add Movie"));
    frame.render_widget(popup, area);
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn modal_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Rgb(160, 190, 235))
                .add_modifier(Modifier::BOLD),
        )
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(205, 165, 255))
    } else {
        Style::default().fg(Color::Rgb(230, 235, 242))
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    let shadow_block = Block::default().style(Style::default().bg(Color::Rgb(14, 16, 24)));
    frame.render_widget(shadow_block, shadow);
}

fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let max_line_width = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let available_width = area.width.saturating_sub(2).max(1);
    let width = max_line_width
        .saturating_add(12)
        .clamp(44.min(available_width), 72.min(available_width));

    let available_height = area.height.saturating_sub(2).max(1);
    let height = line_count
        .saturating_add(6)
        .clamp(8.min(available_height), 16.min(available_height));

    centered_fixed_rect(width, height, area)
}
