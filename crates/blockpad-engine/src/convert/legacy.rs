//! Conversion between the nested tree format and the flat block list.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{
    Block, BlockProps, BlockType, DEFAULT_CODE_LANGUAGE, Node, create_block,
    create_block_with_content, kind,
};

/// Flatten a tree document into blocks.
///
/// Never fails and never returns an empty list: unknown node types become `text`
/// blocks with whatever text they contain, and an empty tree yields a single empty
/// `text` block. Inline marks are dropped; only plain text survives, escaped as
/// markup for rich block types.
pub fn convert_from_old_format(tree: &Node) -> Vec<Block> {
    if !tree.has_content() {
        return vec![create_block(BlockType::Text)];
    }

    let mut blocks = Vec::new();
    for node in tree.children() {
        match node.node_type.as_str() {
            kind::HEADING => {
                let level = node.attr_u64("level").unwrap_or(1);
                blocks.push(rich_block(BlockType::from_heading_level(level), node));
            }
            kind::PARAGRAPH => blocks.push(rich_block(BlockType::Text, node)),
            kind::BULLET_LIST => flatten_list(node, BlockType::Bullet, &mut blocks),
            kind::ORDERED_LIST => flatten_list(node, BlockType::Numbered, &mut blocks),
            kind::TASK_LIST => flatten_list(node, BlockType::Todo, &mut blocks),
            kind::BLOCKQUOTE => blocks.push(rich_block(BlockType::Quote, node)),
            kind::CODE_BLOCK => {
                let mut block = create_block_with_content(BlockType::Code, extract_text(node));
                let language = node
                    .attr_str("language")
                    .filter(|l| !l.is_empty())
                    .unwrap_or(DEFAULT_CODE_LANGUAGE);
                block.props = Some(BlockProps::language(language));
                blocks.push(block);
            }
            kind::HORIZONTAL_RULE => blocks.push(create_block(BlockType::Divider)),
            kind::IMAGE => {
                let mut block = create_block(BlockType::Image);
                block.props = Some(BlockProps::image(
                    node.attr_str("src").unwrap_or_default(),
                    node.attr_str("alt").unwrap_or_default(),
                ));
                blocks.push(block);
            }
            other => {
                log::warn!("unrecognized node type {other:?}, keeping its text as a text block");
                blocks.push(rich_block(BlockType::Text, node));
            }
        }
    }

    if blocks.is_empty() {
        blocks.push(create_block(BlockType::Text));
    }
    blocks
}

fn rich_block(block_type: BlockType, node: &Node) -> Block {
    create_block_with_content(block_type, plain_to_markup(&extract_text(node)))
}

fn flatten_list(list: &Node, block_type: BlockType, out: &mut Vec<Block>) {
    for item in list.children() {
        let text = extract_text(item);
        let content = if block_type.has_rich_content() {
            plain_to_markup(&text)
        } else {
            text
        };
        let mut block = create_block_with_content(block_type, content);
        if block_type == BlockType::Todo {
            block.props = Some(BlockProps::checked(
                item.attr_bool("checked").unwrap_or(false),
            ));
        }
        out.push(block);
    }
}

/// Plain text of a node: its own `text`, else the concatenation of its children's.
pub fn extract_text(node: &Node) -> String {
    match &node.text {
        Some(text) => text.clone(),
        None => node.children().iter().map(extract_text).collect(),
    }
}

/// Build a tree document from blocks.
///
/// Contiguous bullet, numbered and todo blocks are grouped into one list container
/// each. Inline markup in rich content is reduced to plain text.
pub fn convert_to_old_format(blocks: &[Block]) -> Node {
    let mut children: Vec<Node> = Vec::new();
    let mut run: Option<(BlockType, Vec<Node>)> = None;

    for block in blocks {
        if block.block_type.is_list() {
            let item = list_item(block);
            match &mut run {
                Some((t, items)) if *t == block.block_type => items.push(item),
                _ => {
                    if let Some(done) = run.take() {
                        children.push(list_container(done));
                    }
                    run = Some((block.block_type, vec![item]));
                }
            }
            continue;
        }

        if let Some(done) = run.take() {
            children.push(list_container(done));
        }
        children.push(block_node(block));
    }

    if let Some(done) = run.take() {
        children.push(list_container(done));
    }
    Node::doc(children)
}

fn block_node(block: &Block) -> Node {
    let text = plain_text(block);
    match block.block_type {
        BlockType::H1 | BlockType::H2 | BlockType::H3 => {
            Node::heading(block.block_type.heading_level().unwrap_or(1), &text)
        }
        BlockType::Quote => Node::new(kind::BLOCKQUOTE).with_content(vec![Node::paragraph(&text)]),
        BlockType::Code => Node::with_text(kind::CODE_BLOCK, &text).with_attr(
            "language",
            block.language().unwrap_or(DEFAULT_CODE_LANGUAGE),
        ),
        BlockType::Divider => Node::new(kind::HORIZONTAL_RULE),
        BlockType::Image => {
            let props = block.props.clone().unwrap_or_default();
            Node::new(kind::IMAGE)
                .with_attr("src", props.src.unwrap_or_default())
                .with_attr("alt", props.alt.unwrap_or_default())
        }
        _ => Node::paragraph(&text),
    }
}

fn list_item(block: &Block) -> Node {
    let paragraph = Node::paragraph(&plain_text(block));
    match block.block_type {
        BlockType::Todo => Node::new(kind::TASK_ITEM)
            .with_attr("checked", block.is_checked())
            .with_content(vec![paragraph]),
        _ => Node::new(kind::LIST_ITEM).with_content(vec![paragraph]),
    }
}

fn list_container((block_type, items): (BlockType, Vec<Node>)) -> Node {
    match block_type {
        BlockType::Numbered => Node::new(kind::ORDERED_LIST)
            .with_attr("start", 1)
            .with_content(items),
        BlockType::Todo => Node::new(kind::TASK_LIST).with_content(items),
        _ => Node::new(kind::BULLET_LIST).with_content(items),
    }
}

/// Block content as plain text. Rich types carry inline HTML from the text engine;
/// code and other types are already plain.
fn plain_text(block: &Block) -> String {
    if block.block_type.has_rich_content() {
        strip_markup(&block.content)
    } else {
        block.content.clone()
    }
}

/// Drop inline tags (line breaks become newlines) and decode HTML entities.
pub fn strip_markup(html: &str) -> String {
    static BREAK_REGEX: OnceLock<Regex> = OnceLock::new();
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let breaks =
        BREAK_REGEX.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("Invalid break regex"));
    let tags = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

    let with_newlines = breaks.replace_all(html, "\n");
    let without_tags = tags.replace_all(&with_newlines, "");
    html_escape::decode_html_entities(&without_tags).into_owned()
}

/// Escape plain text for storage in a rich block. Inverse of [`strip_markup`] for
/// text without tags.
pub fn plain_to_markup(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Re-encode `content` held by a `from` block for a `to` block. Moving out of a
/// rich type drops markup; moving into one escapes the text.
pub fn convert_content(content: &str, from: BlockType, to: BlockType) -> String {
    match (from.has_rich_content(), to.has_rich_content()) {
        (true, false) => strip_markup(content),
        (false, true) => plain_to_markup(content),
        _ => content.to_string(),
    }
}
