use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::app::{MessageType, StatusMessage};
use super::layout::AppLayout;
use super::timestamps::format_millis;
use crate::models::{ContentKind, HistoryEntry};
use crate::payload;
use crate::utils::{sanitize_for_terminal, sanitize_single_line};

const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const ACCENT: Color = Color::Rgb(16, 185, 129);
const DANGER: Color = Color::Rgb(239, 68, 68);
const BAR: Color = Color::Rgb(24, 24, 27);

/// Everything besides the matched entries that a frame needs
pub struct RenderState<'a> {
    pub search_query: &'a str,
    pub total_count: usize,
    pub selected_idx: usize,
    pub preview_symbol: Option<&'a str>,
    pub clear_armed: bool,
    pub status_message: Option<&'a StatusMessage>,
}

pub fn render_ui(frame: &mut Frame, entries: &[&HistoryEntry], state: &RenderState) {
    let layout = AppLayout::new(frame.area());

    render_search(frame, layout.search_area, state.search_query);
    render_results_list(frame, layout.results_area, entries, state.selected_idx);
    render_preview(
        frame,
        layout.preview_area,
        entries.get(state.selected_idx).copied(),
        state.preview_symbol,
    );
    render_status_bar(frame, layout.status_area, entries.len(), state);
}

fn kind_icon(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Url => "🔗",
        ContentKind::Text => "📝",
        ContentKind::Email => "✉️",
        ContentKind::Phone => "📞",
        ContentKind::Wifi => "📶",
        ContentKind::Vcard => "👤",
    }
}

fn bordered(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).border_style(Style::default().fg(MUTED)).title(title)
}

fn render_search(frame: &mut Frame, area: Rect, query: &str) {
    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(ACCENT)),
        Span::raw(sanitize_single_line(query)),
    ]);
    frame.render_widget(Paragraph::new(line).block(bordered(" Search ")), area);
}

fn render_results_list(
    frame: &mut Frame,
    area: Rect,
    entries: &[&HistoryEntry],
    selected_idx: usize,
) {
    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let name: String = sanitize_single_line(&entry.name).chars().take(50).collect();
            let content = format!(
                "{} {} | {}",
                kind_icon(entry.config.kind),
                format_millis(entry.timestamp),
                name
            );

            let style = if idx == selected_idx {
                Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };

            ListItem::new(content).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(bordered(" History ")), area);
}

fn render_preview(
    frame: &mut Frame,
    area: Rect,
    entry: Option<&HistoryEntry>,
    symbol: Option<&str>,
) {
    let content = match entry {
        Some(entry) => {
            let params = &entry.config.render_params;
            let label = |text: &'static str| Span::styled(text, Style::default().fg(MUTED));

            let mut lines = vec![
                Line::from(vec![label("Name: "), Span::raw(sanitize_single_line(&entry.name))]),
                Line::from(vec![label("Kind: "), Span::raw(entry.config.kind.to_string())]),
                Line::from(vec![label("Saved: "), Span::raw(format_millis(entry.timestamp))]),
                Line::from(vec![
                    label("Render: "),
                    Span::raw(format!(
                        "{} {} on {}, {}px, margin {}, {}",
                        params.error_correction_level,
                        sanitize_single_line(&params.foreground_color),
                        sanitize_single_line(&params.background_color),
                        params.width,
                        params.margin,
                        params.shape
                    )),
                ]),
                Line::from(""),
            ];

            for line in sanitize_for_terminal(&payload::encode(&entry.config)).lines() {
                lines.push(Line::from(line.to_string()));
            }

            if let Some(symbol) = symbol {
                lines.push(Line::from(""));
                lines.extend(symbol.lines().map(|row| Line::from(row.to_string())));
            }

            Text::from(lines)
        }
        None => Text::from("No entry selected"),
    };

    let paragraph = Paragraph::new(content).block(bordered(" Preview ")).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, matched_count: usize, state: &RenderState) {
    let bar = Style::default().bg(BAR);

    let (text, style) = if let Some(msg) = state.status_message {
        let fg = match msg.message_type {
            MessageType::Success => ACCENT,
            MessageType::Error => DANGER,
        };
        (format!(" {} ", msg.text), bar.fg(fg))
    } else if state.total_count == 0 {
        (" History is empty | Esc/Ctrl+C: quit ".to_string(), bar.fg(BRIGHT))
    } else {
        let mut parts = Vec::new();

        if matched_count < state.total_count {
            parts.push(format!("{}/{} matched", matched_count, state.total_count));
        } else {
            parts.push(format!("{} entries", state.total_count));
        }
        if matched_count > 0 {
            parts.push(format!("entry {}/{}", state.selected_idx + 1, matched_count));
        }

        parts.push("Enter: load".to_string());
        parts.push("Ctrl+Y: copy".to_string());
        parts.push("Ctrl+D: delete".to_string());
        let clear_hint = if state.clear_armed { "Ctrl+X: CONFIRM clear" } else { "Ctrl+X: clear" };
        parts.push(clear_hint.to_string());
        let esc_hint = if state.search_query.is_empty() { "Esc: quit" } else { "Esc: clear" };
        parts.push(esc_hint.to_string());

        (format!(" {} ", parts.join(" | ")), bar.fg(BRIGHT))
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}
