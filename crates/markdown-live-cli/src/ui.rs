use std::ops::Range;

use markdown_live_engine::{NotificationLevel, SaveStatus, SearchMode};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, Mode};

pub fn draw(f: &mut Frame, app: &mut App) {
    let has_input_line = matches!(app.mode, Mode::Search | Mode::Prompt { .. })
        || app.session.view().search_bar_open;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(u16::from(has_input_line)),
            Constraint::Length(1),
        ])
        .split(f.area());

    if app.mode == Mode::Documents {
        draw_documents(f, app, rows[0]);
    } else {
        draw_panes(f, app, rows[0]);
    }
    if has_input_line {
        draw_input_line(f, app, rows[1]);
    }
    draw_status(f, app, rows[2]);
}

fn draw_panes(f: &mut Frame, app: &mut App, area: Rect) {
    let view = app.session.view().clone();
    let (editor_area, preview_area) = match (view.shows_editor(), view.shows_preview()) {
        (true, true) => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            (Some(cols[0]), Some(cols[1]))
        }
        (true, false) => (Some(area), None),
        (false, _) => (None, Some(area)),
    };

    if let Some(area) = editor_area {
        draw_editor(f, app, area);
    }
    if let Some(area) = preview_area {
        let preview = Paragraph::new(preview_lines(&app.session.text()))
            .block(Block::default().borders(Borders::ALL).title("Preview"))
            .wrap(Wrap { trim: false });
        f.render_widget(preview, area);
    }
}

fn draw_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let text = app.session.text();
    let selection = app.session.buffer().selection();
    let cursor = app.session.buffer().cursor();
    let (cursor_row, cursor_col) = row_col(&text, cursor);

    let inner_height = area.height.saturating_sub(2);
    app.follow_cursor(cursor_row, inner_height);

    let mut lines = Vec::new();
    let mut line_start = 0;
    for line in text.split('\n') {
        lines.push(highlight_line(line, line_start, &selection));
        line_start += line.len() + 1;
    }

    let title = format!("Editor - {}", app.session.title());
    let editor = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((app.scroll, 0));
    f.render_widget(editor, area);

    if app.mode == Mode::Editing {
        let row = u16::try_from(cursor_row)
            .unwrap_or(u16::MAX)
            .saturating_sub(app.scroll);
        let col = u16::try_from(cursor_col).unwrap_or(u16::MAX);
        if row < inner_height {
            f.set_cursor_position(Position::new(
                area.x + 1 + col.min(area.width.saturating_sub(3)),
                area.y + 1 + row,
            ));
        }
    }
}

/// Split a line into spans so the selected part is drawn reversed
fn highlight_line<'a>(line: &'a str, line_start: usize, selection: &Range<usize>) -> Line<'a> {
    let line_end = line_start + line.len();
    let start = selection.start.clamp(line_start, line_end) - line_start;
    let end = selection.end.clamp(line_start, line_end) - line_start;
    if start == end || !line.is_char_boundary(start) || !line.is_char_boundary(end) {
        return Line::from(line);
    }

    Line::from(vec![
        Span::raw(&line[..start]),
        Span::styled(
            &line[start..end],
            Style::default().add_modifier(Modifier::REVERSED),
        ),
        Span::raw(&line[end..]),
    ])
}

/// Row and character column of a byte offset
fn row_col(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let row = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (row, before[line_start..].chars().count())
}

fn draw_documents(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .session
        .documents()
        .iter()
        .map(|doc| {
            let updated = doc.updated_at.format("%Y-%m-%d %H:%M");
            let marker = if app.session.current_document() == Some(doc.id) {
                "* "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::raw(doc.title.clone()),
                Span::styled(format!("  {updated}"), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = if app.auth_user_label().is_some() {
        "Documents (Enter open | n new | r rename | d delete | Esc back)"
    } else {
        "Documents (sign in with --user to save documents)"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(list, area, &mut app.documents_state);
}

fn draw_input_line(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.mode {
        Mode::Prompt { kind, input } => Line::from(vec![
            Span::styled(
                format!("{}: ", kind.label()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(input.clone()),
        ]),
        _ => {
            let search = app.session.search();
            let mode = match search.mode() {
                SearchMode::Literal => "text",
                SearchMode::Regex => "regex",
            };
            Line::from(vec![
                Span::styled("Search: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(search.query().to_string()),
                Span::styled(
                    format!("  [{}] ({mode}, Ctrl-X toggles)", search.status_label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let stats = app.session.statistics();
    let save = app.session.save_status();
    let save_style = match save {
        SaveStatus::Error => Style::default().fg(Color::Red),
        SaveStatus::Saved => Style::default().fg(Color::Green),
        _ => Style::default().fg(Color::Yellow),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.auth_user_label().unwrap_or("not signed in")),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw(format!(
            " {} words | {} lines | {} chars ",
            stats.words, stats.lines, stats.chars
        )),
        Span::styled(save.to_string(), save_style),
    ];
    if let Some((level, message)) = &app.message {
        let style = match level {
            NotificationLevel::Error => Style::default().fg(Color::Red),
            NotificationLevel::Info => Style::default().fg(Color::Cyan),
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message.clone(), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render markdown into styled terminal lines
pub fn preview_lines(markdown: &str) -> Vec<Line<'static>> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut style_stack = vec![Style::default()];
    let mut list_depth: usize = 0;
    let mut quote_depth: usize = 0;
    let mut in_code_block = false;

    let flush = |current: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
        if !current.is_empty() {
            lines.push(Line::from(std::mem::take(current)));
        }
    };

    for event in Parser::new_ext(markdown, options) {
        let style = style_stack.last().copied().unwrap_or_default();
        match event {
            Event::Start(tag) => {
                let next = match tag {
                    Tag::Heading { level, .. } => {
                        flush(&mut current, &mut lines);
                        let color = match level {
                            HeadingLevel::H1 => Color::Magenta,
                            HeadingLevel::H2 => Color::Cyan,
                            _ => Color::Blue,
                        };
                        style.fg(color).add_modifier(Modifier::BOLD)
                    }
                    Tag::Strong => style.add_modifier(Modifier::BOLD),
                    Tag::Emphasis => style.add_modifier(Modifier::ITALIC),
                    Tag::Strikethrough => style.add_modifier(Modifier::CROSSED_OUT),
                    Tag::Link { .. } => style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                    Tag::CodeBlock(_) => {
                        flush(&mut current, &mut lines);
                        in_code_block = true;
                        style.fg(Color::Green)
                    }
                    Tag::BlockQuote(_) => {
                        flush(&mut current, &mut lines);
                        quote_depth += 1;
                        style.fg(Color::DarkGray)
                    }
                    Tag::List(_) => {
                        flush(&mut current, &mut lines);
                        list_depth += 1;
                        style
                    }
                    Tag::Item => {
                        flush(&mut current, &mut lines);
                        current.push(Span::raw(format!(
                            "{}• ",
                            "  ".repeat(list_depth.saturating_sub(1))
                        )));
                        style
                    }
                    Tag::Paragraph => {
                        if quote_depth > 0 {
                            current.push(Span::styled("> ".repeat(quote_depth), style));
                        }
                        style
                    }
                    _ => style,
                };
                style_stack.push(next);
            }
            Event::End(tag) => {
                style_stack.pop();
                match tag {
                    TagEnd::Heading(_) | TagEnd::Paragraph => {
                        flush(&mut current, &mut lines);
                        if list_depth == 0 {
                            lines.push(Line::default());
                        }
                    }
                    TagEnd::CodeBlock => {
                        in_code_block = false;
                        flush(&mut current, &mut lines);
                        lines.push(Line::default());
                    }
                    TagEnd::BlockQuote(_) => quote_depth = quote_depth.saturating_sub(1),
                    TagEnd::List(_) => {
                        list_depth = list_depth.saturating_sub(1);
                        if list_depth == 0 {
                            lines.push(Line::default());
                        }
                    }
                    TagEnd::Item => flush(&mut current, &mut lines),
                    TagEnd::TableRow | TagEnd::TableHead => flush(&mut current, &mut lines),
                    _ => {}
                }
            }
            Event::Text(text) if in_code_block => {
                for (i, code_line) in text.split('\n').enumerate() {
                    if i > 0 {
                        flush(&mut current, &mut lines);
                    }
                    if !code_line.is_empty() {
                        current.push(Span::styled(format!("  {code_line}"), style));
                    }
                }
            }
            Event::Text(text) => current.push(Span::styled(text.to_string(), style)),
            Event::Code(code) => current.push(Span::styled(
                format!("`{code}`"),
                style.fg(Color::Green),
            )),
            Event::Html(raw) | Event::InlineHtml(raw) => {
                current.push(Span::styled(raw.to_string(), style.fg(Color::DarkGray)))
            }
            Event::SoftBreak => current.push(Span::raw(" ")),
            Event::HardBreak => flush(&mut current, &mut lines),
            Event::Rule => {
                flush(&mut current, &mut lines);
                lines.push(Line::from("────────"));
                lines.push(Line::default());
            }
            Event::TaskListMarker(done) => {
                current.push(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            _ => {}
        }
    }
    flush(&mut current, &mut lines);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_row_col_counts_characters() {
        assert_eq!(row_col("ab\néx", 5), (1, 1));
        assert_eq!(row_col("abc", 99), (0, 3));
    }

    #[test]
    fn test_highlight_line_splits_selection() {
        let line = highlight_line("hello world", 10, &(16..21));

        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "world");
    }

    #[test]
    fn test_preview_lines() {
        let lines = preview_lines("# Title\n\n- one\n- two\n\n> quoted\n");

        assert_eq!(
            plain(&lines),
            vec!["Title", "", "• one", "• two", "", "> quoted", ""]
        );
    }
}
