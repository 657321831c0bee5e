use crate::App;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::rc::Rc;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use wkp_client::CompanyResult;
use wkp_core::console::EXAMPLE_QUERIES;
use wkp_core::render::{self, CardLine, EMPTY_STATE_HINT, EMPTY_STATE_TITLE};

const PROMPT: &str = "> ";

fn layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(4), // Stats panels
            Constraint::Length(3), // Search box
            Constraint::Length(1), // Banner / submit state
            Constraint::Length(1), // Examples
            Constraint::Min(5),    // Results
            Constraint::Length(1), // Hints bar
        ])
        .split(area)
}

/// Rows available for result cards in a frame of the given size.
pub fn results_height(area: Rect) -> usize {
    layout(area)[5].height.saturating_sub(2) as usize
}

/// Draws the whole console for one frame.
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = layout(f.area());

    render_title(f, chunks[0]);
    render_stats(f, app, chunks[1]);
    render_search(f, app, chunks[2]);
    render_banner(f, app, chunks[3]);
    render_examples(f, chunks[4]);
    render_results(f, app, chunks[5]);
    render_hints(f, chunks[6]);
}

fn render_title(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "🧠 Web Knowledge Platform",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "AI-powered web intelligence for Indian businesses",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(text), area);
}

fn render_stats(f: &mut Frame, app: &App, area: Rect) {
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let console = app.console();
    let stats = console.stats();

    let status = stats.status.clone().unwrap_or_else(|| "active".to_string());
    let last_updated = console
        .stats_refreshed_at()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "waiting...".to_string());

    let cells = [
        ("Websites Crawled", stats.urls_crawled.to_string(), Color::Blue),
        ("Entities Found", stats.entities_in_graph.to_string(), Color::Green),
        ("Status", status, Color::Green),
        ("Last Updated", last_updated, Color::White),
    ];

    for ((label, value, color), panel) in cells.into_iter().zip(panels.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let text = vec![
            Line::from(Span::styled(label, Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
        ];
        f.render_widget(Paragraph::new(text).block(block), *panel);
    }
}

fn render_search(f: &mut Frame, app: &App, area: Rect) {
    let console = app.console();
    let border_color = if console.is_loading() {
        Color::DarkGray
    } else {
        Color::Cyan
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Search Business Information ")
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let prompt_width = PROMPT.width() as u16;
    let text_width = inner.width.saturating_sub(prompt_width) as usize;
    let (visible, cursor_column) = input_view(console.query(), app.cursor_position(), text_width);

    let input = if console.query().is_empty() && !console.is_loading() {
        Line::from(vec![
            Span::styled(PROMPT, Style::default().fg(Color::Yellow)),
            Span::styled(
                "e.g., 'steel companies contact information'",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else {
        let style = if console.is_loading() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };
        Line::from(vec![
            Span::styled(PROMPT, Style::default().fg(Color::Yellow)),
            Span::styled(visible, style),
        ])
    };
    f.render_widget(Paragraph::new(input), inner);

    // No cursor while the input is disabled
    if !console.is_loading() {
        f.set_cursor_position((inner.x + prompt_width + cursor_column, inner.y));
    }
}

/// Slice of `query` that fits in `width` columns with the cursor (given in
/// chars) on screen, and the cursor's display column within that slice.
pub(crate) fn input_view(query: &str, cursor: usize, width: usize) -> (String, u16) {
    let chars: Vec<char> = query.chars().collect();
    let cursor = cursor.min(chars.len());
    let char_width = |c: &char| c.width().unwrap_or(0);

    // Drop leading chars until the cursor cell fits
    let mut start = 0;
    let mut cursor_column: usize = chars[..cursor].iter().map(char_width).sum();
    while start < cursor && cursor_column >= width.max(1) {
        cursor_column -= char_width(&chars[start]);
        start += 1;
    }

    let mut used = 0;
    let visible: String = chars[start..]
        .iter()
        .take_while(|c| {
            used += char_width(*c);
            used <= width
        })
        .collect();

    (visible, cursor_column as u16)
}

fn render_banner(f: &mut Frame, app: &App, area: Rect) {
    let console = app.console();

    let line = if let Some(message) = console.message() {
        Line::from(vec![
            Span::styled(
                format!(" {} ", message),
                Style::default().fg(Color::Black).bg(Color::Yellow),
            ),
            Span::styled("  Ctrl+D to dismiss", Style::default().fg(Color::DarkGray)),
        ])
    } else if console.is_loading() {
        Line::from(Span::styled(
            "⠋ Searching...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Black).bg(Color::Blue)),
            Span::raw(" Search Knowledge Base"),
        ])
    };

    f.render_widget(Paragraph::new(line), area);
}

fn render_examples(f: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw("💡 Try these examples: ")];
    for (idx, (label, _)) in EXAMPLE_QUERIES.iter().enumerate() {
        spans.push(Span::styled(
            format!(" F{} ", idx + 1),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        spans.push(Span::raw(format!(" {}  ", label)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let console = app.console();
    let results = console.results();

    if results.is_empty() {
        if console.show_empty_state() {
            let text = vec![
                Line::from(""),
                Line::from("🔍"),
                Line::from(Span::styled(
                    EMPTY_STATE_TITLE,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(EMPTY_STATE_HINT, Style::default().fg(Color::DarkGray))),
            ];
            f.render_widget(
                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                area,
            );
        }
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", render::results_heading(results.len())))
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = result_lines(results);
    let height = inner.height as usize;
    let total_lines = lines.len();
    let scroll_offset = app.scroll_offset().min(total_lines.saturating_sub(height));

    let visible: Vec<Line> = lines.into_iter().skip(scroll_offset).take(height).collect();
    f.render_widget(Paragraph::new(visible), inner);

    if total_lines > height {
        render_scrollbar(f, area, total_lines, height, scroll_offset);
    }
}

/// Flattens all result cards into styled lines, one blank line between
/// cards.
pub(crate) fn result_lines(results: &[CompanyResult]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, result) in results.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        for card_line in render::card_lines(result) {
            lines.push(style_card_line(card_line));
        }
    }

    lines
}

fn style_card_line(card_line: CardLine) -> Line<'static> {
    match card_line {
        CardLine::Title(name) => Line::from(Span::styled(
            name,
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )),
        CardLine::Domain(domain) => {
            Line::from(Span::styled(domain, Style::default().fg(Color::Gray)))
        }
        CardLine::Badges { confidence, pages } => Line::from(vec![
            Span::styled(
                format!(" Confidence: {} ", confidence),
                Style::default().fg(Color::Black).bg(Color::LightBlue),
            ),
            Span::raw(" "),
            Span::styled(
                format!(" {} ", pages),
                Style::default().fg(Color::Black).bg(Color::Gray),
            ),
        ]),
        CardLine::ContactHeading => Line::from(Span::styled(
            "  Contact Information:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        CardLine::EmailHeading => {
            Line::from(Span::styled("    Email:", Style::default().fg(Color::DarkGray)))
        }
        CardLine::Email { address, href } => Line::from(vec![
            Span::raw("      "),
            Span::styled(
                address,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Span::styled(format!("  <{}>", href), Style::default().fg(Color::DarkGray)),
        ]),
        CardLine::PhoneHeading => {
            Line::from(Span::styled("    Phone:", Style::default().fg(Color::DarkGray)))
        }
        CardLine::Phone(phone) => Line::from(vec![
            Span::raw("      "),
            Span::styled(phone, Style::default().fg(Color::Green)),
        ]),
    }
}

fn render_scrollbar(
    f: &mut Frame,
    area: Rect,
    total_items: usize,
    visible_items: usize,
    scroll_offset: usize,
) {
    let scrollbar_height = area.height.saturating_sub(2) as usize; // -2 for borders
    if scrollbar_height == 0 {
        return;
    }

    let thumb_size = ((visible_items as f32 / total_items as f32) * scrollbar_height as f32)
        .max(1.0)
        .floor() as usize;

    let scroll_ratio = scroll_offset as f32 / (total_items - visible_items) as f32;
    let thumb_position =
        (scroll_ratio * scrollbar_height.saturating_sub(thumb_size) as f32).floor() as usize;

    let scrollbar_x = area.x + area.width - 1;
    let scrollbar_start_y = area.y + 1;

    for i in 0..scrollbar_height {
        let in_thumb = i >= thumb_position && i < thumb_position + thumb_size;
        let (symbol, style) = if in_thumb {
            ("█", Style::default().fg(Color::Cyan))
        } else {
            ("│", Style::default().fg(Color::DarkGray))
        };

        f.render_widget(
            Paragraph::new(symbol).style(style),
            Rect {
                x: scrollbar_x,
                y: scrollbar_start_y + i as u16,
                width: 1,
                height: 1,
            },
        );
    }
}

fn render_hints(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Black).bg(Color::Gray);
    let hints = Line::from(vec![
        Span::styled(" Enter ", key),
        Span::raw(" Search  "),
        Span::styled(" ↑/↓ ", key),
        Span::raw(" History  "),
        Span::styled(" PgUp/PgDn ", key),
        Span::raw(" Scroll  "),
        Span::styled(" Ctrl+D ", key),
        Span::raw(" Dismiss  "),
        Span::styled(" Esc ", key),
        Span::raw(" Quit"),
    ]);

    f.render_widget(
        Paragraph::new(hints).style(Style::default().bg(Color::Black).fg(Color::Gray)),
        area,
    );
}
