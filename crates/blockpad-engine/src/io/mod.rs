pub mod autosave;

pub use autosave::{AutoSave, SaveStatus};

use crate::convert::{
    blocks_to_markdown, convert_from_old_format, convert_to_old_format, markdown_to_blocks,
};
use crate::models::{Block, BlockType, Node, create_block};
use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk representations of a document, chosen by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.md`
    Markdown,
    /// `.json`, a flat block array
    Blocks,
    /// `.tree.json`, the nested node tree
    Tree,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tree.json") {
            Some(Self::Tree)
        } else if name.ends_with(".json") {
            Some(Self::Blocks)
        } else if name.ends_with(".md") {
            Some(Self::Markdown)
        } else {
            None
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(Self::Markdown),
            "json" | "blocks" => Some(Self::Blocks),
            "tree" => Some(Self::Tree),
            _ => None,
        }
    }
}

/// Decode a document into a non-empty block list.
///
/// JSON input may be either a block array or a tree, regardless of which JSON
/// flavour the file name suggests.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Vec<Block>, IoError> {
    let blocks = match format {
        DocumentFormat::Markdown => markdown_to_blocks(content),
        DocumentFormat::Blocks | DocumentFormat::Tree => {
            let value: serde_json::Value = serde_json::from_str(content)?;
            if value.is_array() {
                serde_json::from_value::<Vec<Block>>(value)?
            } else {
                let tree: Node = serde_json::from_value(value)?;
                convert_from_old_format(&tree)
            }
        }
    };

    if blocks.is_empty() {
        return Ok(vec![create_block(BlockType::Text)]);
    }
    Ok(blocks)
}

/// Encode blocks in `format`. JSON output is pretty-printed.
pub fn serialize_document(blocks: &[Block], format: DocumentFormat) -> Result<String, IoError> {
    Ok(match format {
        DocumentFormat::Markdown => blocks_to_markdown(blocks),
        DocumentFormat::Blocks => serde_json::to_string_pretty(blocks)?,
        DocumentFormat::Tree => serde_json::to_string_pretty(&convert_to_old_format(blocks))?,
    })
}

/// Read a file and return its content
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a file
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Load a document, picking the format from its file name.
pub fn load_document(relative_path: &RelativePath, notes_root: &Path) -> Result<Vec<Block>, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    let format = DocumentFormat::from_path(&absolute_path)
        .ok_or_else(|| IoError::UnsupportedFormat(absolute_path.clone()))?;
    let content = read_file(relative_path, notes_root)?;
    let blocks = parse_document(&content, format)?;
    log::debug!("loaded {} blocks from {}", blocks.len(), absolute_path.display());
    Ok(blocks)
}

/// Save a document, picking the format from its file name.
pub fn save_document(
    relative_path: &RelativePath,
    notes_root: &Path,
    blocks: &[Block],
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    let format = DocumentFormat::from_path(&absolute_path)
        .ok_or_else(|| IoError::UnsupportedFormat(absolute_path.clone()))?;
    let content = serialize_document(blocks, format)?;
    write_file(relative_path, notes_root, &content)?;
    log::debug!("saved {} blocks to {}", blocks.len(), absolute_path.display());
    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}
