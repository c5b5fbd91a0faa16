use chrono::Utc;
use uuid::Uuid;

use super::block::{Block, BlockProps, BlockType};

/// Language tag used for code blocks with no (or an unusable) language.
pub const DEFAULT_CODE_LANGUAGE: &str = "plaintext";

/// Generate a fresh block id.
pub fn new_block_id() -> String {
    Uuid::new_v4().to_string()
}

/// Props a freshly created or converted block of `block_type` starts with.
pub fn default_props(block_type: BlockType) -> Option<BlockProps> {
    match block_type {
        BlockType::Todo => Some(BlockProps::checked(false)),
        BlockType::Code => Some(BlockProps::language(DEFAULT_CODE_LANGUAGE)),
        _ => None,
    }
}

/// Hint text a view shows inside an empty block of `block_type`.
pub fn placeholder(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Text => "Type '/' for commands",
        BlockType::H1 => "Heading 1",
        BlockType::H2 => "Heading 2",
        BlockType::H3 => "Heading 3",
        BlockType::Bullet | BlockType::Numbered => "List",
        BlockType::Todo => "To-do",
        BlockType::Quote => "Empty quote",
        BlockType::Code => "Code",
        BlockType::Image => "Add an image",
        BlockType::Divider => "",
    }
}

/// Create an empty block of `block_type` with a new id and default props.
pub fn create_block(block_type: BlockType) -> Block {
    create_block_with_content(block_type, String::new())
}

pub fn create_block_with_content(block_type: BlockType, content: impl Into<String>) -> Block {
    let now = Utc::now();
    Block {
        id: new_block_id(),
        block_type,
        content: content.into(),
        props: default_props(block_type),
        created_at: now,
        updated_at: now,
    }
}
