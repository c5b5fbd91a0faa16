use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The type tag of a block. Serialized in the lowercase spelling used by saved documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    H1,
    H2,
    H3,
    Bullet,
    Numbered,
    Todo,
    Quote,
    Divider,
    Code,
    Image,
}

impl BlockType {
    pub const ALL: [BlockType; 11] = [
        BlockType::Text,
        BlockType::H1,
        BlockType::H2,
        BlockType::H3,
        BlockType::Bullet,
        BlockType::Numbered,
        BlockType::Todo,
        BlockType::Quote,
        BlockType::Divider,
        BlockType::Code,
        BlockType::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::H1 => "h1",
            BlockType::H2 => "h2",
            BlockType::H3 => "h3",
            BlockType::Bullet => "bullet",
            BlockType::Numbered => "numbered",
            BlockType::Todo => "todo",
            BlockType::Quote => "quote",
            BlockType::Divider => "divider",
            BlockType::Code => "code",
            BlockType::Image => "image",
        }
    }

    /// Heading level for `h1`..`h3`, `None` for every other type.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            BlockType::H1 => Some(1),
            BlockType::H2 => Some(2),
            BlockType::H3 => Some(3),
            _ => None,
        }
    }

    /// Heading type for a tree `level` attribute. Anything outside 2..=3 maps to `h1`.
    pub fn from_heading_level(level: u64) -> Self {
        match level {
            2 => BlockType::H2,
            3 => BlockType::H3,
            _ => BlockType::H1,
        }
    }

    /// Types whose content is rich inline markup owned by the embedded text engine.
    pub fn has_rich_content(&self) -> bool {
        matches!(
            self,
            BlockType::Text
                | BlockType::H1
                | BlockType::H2
                | BlockType::H3
                | BlockType::Quote
                | BlockType::Bullet
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockType::Bullet | BlockType::Numbered | BlockType::Todo)
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific properties. Only the fields relevant to a block's type are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl BlockProps {
    pub fn checked(checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Self::default()
        }
    }

    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::default()
        }
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            alt: Some(alt.into()),
            ..Self::default()
        }
    }
}

/// A single unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<BlockProps>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Block {
    /// Content length in characters, the unit caret offsets are measured in.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_checked(&self) -> bool {
        self.props
            .as_ref()
            .and_then(|p| p.checked)
            .unwrap_or(false)
    }

    pub fn language(&self) -> Option<&str> {
        self.props.as_ref().and_then(|p| p.language.as_deref())
    }

    /// Merge a partial update into this block and refresh `updated_at`.
    pub fn apply(&mut self, patch: BlockPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(block_type) = patch.block_type {
            self.block_type = block_type;
        }
        if let Some(props) = patch.props {
            self.props = Some(props);
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial update for [`Block::apply`]. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPatch {
    pub content: Option<String>,
    pub block_type: Option<BlockType>,
    pub props: Option<BlockProps>,
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn props(props: BlockProps) -> Self {
        Self {
            props: Some(props),
            ..Self::default()
        }
    }
}
