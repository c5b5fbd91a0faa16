//! Line-based Markdown codec for the tree format.
//!
//! This is deliberately not CommonMark: each block kind is recognised by a single
//! line pattern and inline content is carried as plain text (no emphasis, links or
//! other marks are parsed).

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{DEFAULT_CODE_LANGUAGE, Node, kind};

use super::legacy::extract_text;

const FENCE: &str = "```";

// ---------------------------------------------------------------------------
// Tree -> Markdown
// ---------------------------------------------------------------------------

/// Render a tree as Markdown, one blank line between block-level elements.
pub fn json_to_markdown(tree: &Node) -> String {
    let mut chunks = Vec::new();
    render_block(tree, &mut chunks);
    chunks.join("\n\n").trim_end().to_string()
}

fn render_block(node: &Node, out: &mut Vec<String>) {
    match node.node_type.as_str() {
        kind::DOC => {
            for child in node.children() {
                render_block(child, out);
            }
        }
        kind::HEADING => {
            let level = node.attr_u64("level").unwrap_or(1).clamp(1, 6) as usize;
            out.push(format!("{} {}", "#".repeat(level), inline_text(node)));
        }
        kind::PARAGRAPH => {
            let text = inline_text(node);
            if !text.is_empty() {
                out.push(text);
            }
        }
        kind::BULLET_LIST => out.push(render_items(node, |_, item| {
            format!("- {}", item_text(item))
        })),
        kind::ORDERED_LIST => {
            let start = node.attr_u64("start").unwrap_or(1);
            out.push(render_items(node, |i, item| {
                format!("{}. {}", start.saturating_add(i as u64), item_text(item))
            }));
        }
        kind::TASK_LIST => out.push(render_items(node, |_, item| {
            let mark = if item.attr_bool("checked").unwrap_or(false) {
                'x'
            } else {
                ' '
            };
            format!("- [{mark}] {}", item_text(item))
        })),
        kind::BLOCKQUOTE => {
            let text = node
                .children()
                .iter()
                .map(inline_text)
                .collect::<Vec<_>>()
                .join("\n");
            let quoted = text
                .lines()
                .map(|l| format!("> {l}"))
                .collect::<Vec<_>>()
                .join("\n");
            out.push(if quoted.is_empty() {
                ">".to_string()
            } else {
                quoted
            });
        }
        kind::CODE_BLOCK => {
            let language = node.attr_str("language").unwrap_or_default();
            let code = extract_text(node);
            out.push(format!(
                "{FENCE}{language}\n{}\n{FENCE}",
                code.trim_end_matches('\n')
            ));
        }
        kind::HORIZONTAL_RULE => out.push("---".to_string()),
        kind::IMAGE => out.push(format!(
            "![{}]({})",
            node.attr_str("alt").unwrap_or_default(),
            node.attr_str("src").unwrap_or_default()
        )),
        kind::TABLE => out.push(render_table(node)),
        _ => {
            let text = inline_text(node);
            if !text.is_empty() {
                out.push(text);
            }
        }
    }
}

fn render_items(list: &Node, line: impl Fn(usize, &Node) -> String) -> String {
    list.children()
        .iter()
        .enumerate()
        .map(|(i, item)| line(i, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Only an item's first block is represented; nested content is dropped.
fn item_text(item: &Node) -> String {
    match item.children().first() {
        Some(first) => inline_text(first),
        None => inline_text(item),
    }
}

fn render_table(table: &Node) -> String {
    let mut lines = Vec::new();
    for (i, row) in table.children().iter().enumerate() {
        let cells: Vec<String> = row.children().iter().map(inline_text).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
        if i == 0 {
            let separator = vec!["---"; cells.len()];
            lines.push(format!("| {} |", separator.join(" | ")));
        }
    }
    lines.join("\n")
}

/// Plain text of inline content, with hard breaks as newlines.
fn inline_text(node: &Node) -> String {
    if node.is(kind::HARD_BREAK) {
        return "\n".to_string();
    }
    match &node.text {
        Some(text) => text.clone(),
        None => node.children().iter().map(inline_text).collect(),
    }
}

// ---------------------------------------------------------------------------
// Markdown -> Tree
// ---------------------------------------------------------------------------

/// Parse Markdown into a tree in a single forward pass.
pub fn markdown_to_json(markdown: &str) -> Node {
    let mut reader = MarkdownReader::new();
    for line in markdown.lines() {
        reader.push(line);
    }
    Node::doc(reader.finish())
}

/// Restrict a fence info string to `[A-Za-z0-9+#-]+`, anything else becomes `plaintext`.
pub fn sanitize_language(raw: &str) -> String {
    static LANGUAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    let valid = LANGUAGE_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9+#-]+$").expect("Invalid language regex"));
    let raw = raw.trim();
    if valid.is_match(raw) {
        raw.to_string()
    } else {
        DEFAULT_CODE_LANGUAGE.to_string()
    }
}

struct Patterns {
    heading: Regex,
    rule: Regex,
    quote: Regex,
    task: Regex,
    bullet: Regex,
    ordered: Regex,
    image: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        heading: Regex::new(r"^(#{1,6})(?:\s+(.*))?$").expect("Invalid heading regex"),
        rule: Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").expect("Invalid rule regex"),
        quote: Regex::new(r"^>\s?(.*)$").expect("Invalid quote regex"),
        task: Regex::new(r"^\s*[-*]\s+\[([ xX])\](?:\s+(.*))?$").expect("Invalid task regex"),
        bullet: Regex::new(r"^\s*[-*](?:\s+(.*))?$").expect("Invalid bullet regex"),
        ordered: Regex::new(r"^\s*(\d+)\.(?:\s+(.*))?$").expect("Invalid ordered regex"),
        image: Regex::new(r"^!\[([^\]]*)\]\(([^)\s]*)\)$").expect("Invalid image regex"),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Ordered,
    Task,
}

#[derive(Debug)]
enum OpenState {
    None,
    List {
        kind: ListKind,
        start: u64,
        items: Vec<Node>,
    },
    Fence {
        language: String,
        lines: Vec<String>,
    },
}

/// Stateful line consumer. Lists and fences stay open across lines; everything
/// else is emitted as soon as its line is seen.
struct MarkdownReader {
    open: OpenState,
    out: Vec<Node>,
}

impl MarkdownReader {
    fn new() -> Self {
        Self {
            open: OpenState::None,
            out: vec![],
        }
    }

    fn push(&mut self, line: &str) {
        if let OpenState::Fence { lines, .. } = &mut self.open {
            if line.trim_start().starts_with(FENCE) {
                self.flush();
            } else {
                lines.push(line.to_string());
            }
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.flush();
            return;
        }

        let p = patterns();

        if let Some(caps) = p.heading.captures(trimmed) {
            let level = caps[1].len() as u8;
            let text = caps.get(2).map_or("", |m| m.as_str().trim());
            self.emit(Node::heading(level, text));
        } else if p.rule.is_match(trimmed) {
            self.emit(Node::new(kind::HORIZONTAL_RULE));
        } else if let Some(info) = trimmed.strip_prefix(FENCE) {
            self.flush();
            self.open = OpenState::Fence {
                language: sanitize_language(info),
                lines: vec![],
            };
        } else if let Some(caps) = p.quote.captures(trimmed) {
            self.emit(
                Node::new(kind::BLOCKQUOTE).with_content(vec![Node::paragraph(caps[1].trim())]),
            );
        } else if let Some(caps) = p.task.captures(line) {
            let checked = !caps[1].trim().is_empty();
            let text = caps.get(2).map_or("", |m| m.as_str().trim());
            let item = Node::new(kind::TASK_ITEM)
                .with_attr("checked", checked)
                .with_content(vec![Node::paragraph(text)]);
            self.push_item(ListKind::Task, 1, item);
        } else if let Some(caps) = p.bullet.captures(line) {
            let text = caps.get(1).map_or("", |m| m.as_str().trim());
            let item = Node::new(kind::LIST_ITEM).with_content(vec![Node::paragraph(text)]);
            self.push_item(ListKind::Bullet, 1, item);
        } else if let Some(caps) = p.ordered.captures(line) {
            let start = caps[1].parse().unwrap_or(1);
            let text = caps.get(2).map_or("", |m| m.as_str().trim());
            let item = Node::new(kind::LIST_ITEM).with_content(vec![Node::paragraph(text)]);
            self.push_item(ListKind::Ordered, start, item);
        } else if let Some(caps) = p.image.captures(trimmed) {
            self.emit(
                Node::new(kind::IMAGE)
                    .with_attr("src", &caps[2])
                    .with_attr("alt", &caps[1]),
            );
        } else {
            self.emit(Node::paragraph(trimmed));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        // EOF flush, an unterminated fence still becomes a code block
        self.flush();
        self.out
    }

    fn emit(&mut self, node: Node) {
        self.flush();
        self.out.push(node);
    }

    fn push_item(&mut self, list_kind: ListKind, start: u64, item: Node) {
        match &mut self.open {
            OpenState::List {
                kind: open_kind,
                items,
                ..
            } if *open_kind == list_kind => items.push(item),
            _ => {
                self.flush();
                self.open = OpenState::List {
                    kind: list_kind,
                    start,
                    items: vec![item],
                };
            }
        }
    }

    fn flush(&mut self) {
        match std::mem::replace(&mut self.open, OpenState::None) {
            OpenState::None => {}
            OpenState::List {
                kind: list_kind,
                start,
                items,
            } => {
                let node = match list_kind {
                    ListKind::Bullet => Node::new(kind::BULLET_LIST),
                    ListKind::Task => Node::new(kind::TASK_LIST),
                    ListKind::Ordered => Node::new(kind::ORDERED_LIST).with_attr("start", start),
                };
                self.out.push(node.with_content(items));
            }
            OpenState::Fence { language, lines } => {
                self.out.push(
                    Node::with_text(kind::CODE_BLOCK, &lines.join("\n"))
                        .with_attr("language", language),
                );
            }
        }
    }
}
