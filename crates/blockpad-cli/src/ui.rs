use crate::app::{App, display_text};
use blockpad_engine::{Block as DocBlock, BlockType, SaveStatus, get_list_index, placeholder};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

const MENU_WIDTH: u16 = 44;
const MENU_MAX_ROWS: u16 = 8;

/// Marker drawn in front of a block's first line.
fn prefix(blocks: &[DocBlock], index: usize) -> String {
    let block = &blocks[index];
    match block.block_type {
        BlockType::Bullet => "• ".to_string(),
        BlockType::Numbered => format!("{}. ", get_list_index(blocks, index)),
        BlockType::Todo if block.is_checked() => "[x] ".to_string(),
        BlockType::Todo => "[ ] ".to_string(),
        BlockType::Quote => "│ ".to_string(),
        BlockType::Code => "  ".to_string(),
        BlockType::Image => "[image] ".to_string(),
        _ => String::new(),
    }
}

fn style_for(block: &DocBlock) -> Style {
    match block.block_type {
        BlockType::H1 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        BlockType::H2 => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        BlockType::H3 => Style::default().add_modifier(Modifier::BOLD),
        BlockType::Quote => Style::default().add_modifier(Modifier::ITALIC),
        BlockType::Code => Style::default().fg(Color::Green),
        BlockType::Todo if block.is_checked() => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT),
        _ => Style::default(),
    }
}

/// Text shown for an image block: its source if it has one.
fn image_label(block: &DocBlock) -> String {
    block
        .props
        .as_ref()
        .and_then(|p| p.src.clone())
        .unwrap_or_else(|| block.content.clone())
}

struct Rendered {
    lines: Vec<Line<'static>>,
    /// Row and column of the caret, relative to the top-left of the text.
    cursor: Option<(u16, u16)>,
}

fn render_blocks(app: &App, width: u16) -> Rendered {
    let blocks = app.store().blocks();
    let mut lines = Vec::new();
    let mut cursor = None;

    for (index, block) in blocks.iter().enumerate() {
        let focused = block.id == app.focused();

        if block.block_type == BlockType::Divider {
            if focused {
                cursor = Some((lines.len() as u16, 0));
            }
            lines.push(Line::styled(
                "─".repeat(width as usize),
                Style::default().fg(Color::DarkGray),
            ));
            continue;
        }

        let marker = prefix(blocks, index);
        let indent = " ".repeat(marker.chars().count());
        let style = style_for(block);
        let text = if block.block_type == BlockType::Image {
            image_label(block)
        } else {
            display_text(block)
        };

        if focused {
            let before: String = text.chars().take(app.caret()).collect();
            let row = before.matches('\n').count();
            let column = before.rsplit('\n').next().unwrap_or("").chars().count();
            cursor = Some((
                (lines.len() + row) as u16,
                (marker.chars().count() + column) as u16,
            ));
        }

        if text.is_empty() {
            let hint = if focused {
                placeholder(block.block_type)
            } else {
                ""
            };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(hint, Style::default().fg(Color::DarkGray)),
            ]));
            continue;
        }

        for (i, part) in text.split('\n').enumerate() {
            let lead = if i == 0 { marker.clone() } else { indent.clone() };
            lines.push(Line::from(vec![
                Span::raw(lead),
                Span::styled(part.to_string(), style),
            ]));
        }
    }

    Rendered { lines, cursor }
}

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let title = app
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let editor = Block::default().borders(Borders::ALL).title(title);
    let inner = editor.inner(chunks[0]);

    let rendered = render_blocks(app, inner.width);
    let scroll = match rendered.cursor {
        Some((row, _)) if inner.height > 0 && row >= inner.height => row - inner.height + 1,
        _ => 0,
    };

    let content = Paragraph::new(rendered.lines)
        .block(editor)
        .scroll((scroll, 0));
    f.render_widget(content, chunks[0]);

    let caret = rendered.cursor.map(|(row, column)| {
        Position::new(
            (inner.x + column).min(inner.right().saturating_sub(1)),
            inner.y + row - scroll,
        )
    });

    if app.store().slash_menu().is_open {
        render_slash_menu(f, app, caret.unwrap_or(Position::new(inner.x, inner.y)));
    } else if let Some(position) = caret {
        f.set_cursor_position(position);
    }

    f.render_widget(Paragraph::new(footer(app)), chunks[1]);
}

fn render_slash_menu(f: &mut Frame, app: &App, caret: Position) {
    let matches = app.slash_matches();
    let area = f.area();
    let rows = (matches.len() as u16).clamp(1, MENU_MAX_ROWS) + 2;
    let width = MENU_WIDTH.min(area.width);
    let x = caret.x.min(area.right().saturating_sub(width));
    let y = if caret.y + 1 + rows <= area.bottom() {
        caret.y + 1
    } else {
        caret.y.saturating_sub(rows)
    };
    let popup = Rect::new(x, y, width, rows.min(area.height));

    let items: Vec<ListItem> = if matches.is_empty() {
        vec![ListItem::new(Line::styled(
            "No matching commands",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        matches
            .iter()
            .map(|command| {
                ListItem::new(Line::from(vec![
                    Span::styled(command.label, Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::styled(command.description, Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect()
    };

    let mut state = ListState::default();
    if !matches.is_empty() {
        state.select(Some(0));
    }
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("/{}", app.store().slash_menu().query)),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_widget(Clear, popup);
    f.render_stateful_widget(list, popup, &mut state);
}

fn footer(app: &App) -> Line<'static> {
    let status = match app.save_status() {
        SaveStatus::Error(e) => Span::styled(format!("save failed: {e}"), Style::default().fg(Color::Red)),
        status if app.is_dirty() => Span::raw(format!("{status} (unsaved changes)")),
        status => Span::raw(status.to_string()),
    };
    Line::from(vec![
        status,
        Span::raw(" | "),
        Span::raw("Ctrl+S: Save | Ctrl+Q: Quit | Ctrl+T: Toggle to-do | /: Commands"),
    ])
}
