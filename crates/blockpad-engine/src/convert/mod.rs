//! # Interchange Formats
//!
//! Pure conversions between the three shapes a document can take:
//!
//! - the flat block list edited by [`crate::editing::BlockStore`]
//! - the nested tree format ([`crate::models::Node`]) used by older saves and the
//!   embedded rich-text engine
//! - Markdown text
//!
//! Tree ⇄ blocks lives in [`legacy`], tree ⇄ Markdown in [`markdown`]. HTML is not
//! handled here; the rich-text engine owns its own HTML codec.

pub mod legacy;
pub mod markdown;

pub use legacy::{
    convert_content, convert_from_old_format, convert_to_old_format, extract_text,
    plain_to_markup, strip_markup,
};
pub use markdown::{json_to_markdown, markdown_to_json, sanitize_language};

use crate::models::Block;

/// Export blocks as Markdown (blocks → tree → Markdown).
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    json_to_markdown(&convert_to_old_format(blocks))
}

/// Import Markdown as blocks (Markdown → tree → blocks). Never returns an empty list.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    convert_from_old_format(&markdown_to_json(markdown))
}
