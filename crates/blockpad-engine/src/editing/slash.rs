use crate::models::BlockType;

/// An entry of the `/` command palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand {
    pub block_type: BlockType,
    pub label: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

impl SlashCommand {
    /// Case-insensitive substring match; `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.keywords.iter().any(|k| k.to_lowercase().contains(needle))
    }
}

/// The block-insertion catalog, in palette order.
pub const SLASH_COMMANDS: &[SlashCommand] = &[
    SlashCommand {
        block_type: BlockType::Text,
        label: "Text",
        description: "Just start writing with plain text.",
        keywords: &["text", "paragraph", "plain"],
    },
    SlashCommand {
        block_type: BlockType::H1,
        label: "Heading 1",
        description: "Big section heading.",
        keywords: &["h1", "title", "large"],
    },
    SlashCommand {
        block_type: BlockType::H2,
        label: "Heading 2",
        description: "Medium section heading.",
        keywords: &["h2", "subtitle", "medium"],
    },
    SlashCommand {
        block_type: BlockType::H3,
        label: "Heading 3",
        description: "Small section heading.",
        keywords: &["h3", "small"],
    },
    SlashCommand {
        block_type: BlockType::Bullet,
        label: "Bulleted list",
        description: "Create a simple bulleted list.",
        keywords: &["bullet", "list", "unordered", "ul"],
    },
    SlashCommand {
        block_type: BlockType::Numbered,
        label: "Numbered list",
        description: "Create a list with numbering.",
        keywords: &["numbered", "ordered", "list", "ol"],
    },
    SlashCommand {
        block_type: BlockType::Todo,
        label: "To-do list",
        description: "Track tasks with a to-do list.",
        keywords: &["todo", "task", "checkbox", "check"],
    },
    SlashCommand {
        block_type: BlockType::Quote,
        label: "Quote",
        description: "Capture a quote.",
        keywords: &["quote", "blockquote", "citation"],
    },
    SlashCommand {
        block_type: BlockType::Divider,
        label: "Divider",
        description: "Visually divide blocks.",
        keywords: &["divider", "hr", "rule", "separator", "line"],
    },
    SlashCommand {
        block_type: BlockType::Code,
        label: "Code",
        description: "Capture a code snippet.",
        keywords: &["code", "snippet", "pre"],
    },
    SlashCommand {
        block_type: BlockType::Image,
        label: "Image",
        description: "Upload or embed with a link.",
        keywords: &["image", "picture", "photo", "img"],
    },
];

/// Commands whose label, description or any keyword contains `query`, ignoring case.
/// Whitespace is part of the needle. An empty query returns every command, in
/// catalog order.
pub fn filter_commands<'a>(commands: &'a [SlashCommand], query: &str) -> Vec<&'a SlashCommand> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return commands.iter().collect();
    }
    commands.iter().filter(|c| c.matches(&needle)).collect()
}
