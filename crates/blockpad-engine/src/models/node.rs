use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node type names used by the tree interchange format.
pub mod kind {
    pub const DOC: &str = "doc";
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const BULLET_LIST: &str = "bulletList";
    pub const ORDERED_LIST: &str = "orderedList";
    pub const TASK_LIST: &str = "taskList";
    pub const LIST_ITEM: &str = "listItem";
    pub const TASK_ITEM: &str = "taskItem";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const CODE_BLOCK: &str = "codeBlock";
    pub const HORIZONTAL_RULE: &str = "horizontalRule";
    pub const IMAGE: &str = "image";
    pub const TABLE: &str = "table";
    pub const TABLE_ROW: &str = "tableRow";
    pub const TABLE_CELL: &str = "tableCell";
    pub const TABLE_HEADER: &str = "tableHeader";
    pub const TEXT: &str = "text";
    pub const HARD_BREAK: &str = "hardBreak";
}

/// A node of the nested rich-document tree (`{ type, attrs?, content?, text?, marks? }`).
///
/// The type is kept as a string so unknown node types survive a load and can be
/// degraded rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Value>>,
}

impl Node {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            ..Self::default()
        }
    }

    pub fn doc(children: Vec<Node>) -> Self {
        Self::new(kind::DOC).with_content(children)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            node_type: kind::TEXT.to_string(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// A node wrapping `text` in a single text child; empty text yields no children.
    pub fn with_text(node_type: impl Into<String>, text: &str) -> Self {
        let node = Self::new(node_type);
        if text.is_empty() {
            node
        } else {
            node.with_content(vec![Self::text(text)])
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self::with_text(kind::PARAGRAPH, text)
    }

    pub fn heading(level: u8, text: &str) -> Self {
        Self::with_text(kind::HEADING, text).with_attr("level", level)
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn with_content(mut self, children: Vec<Node>) -> Self {
        self.content = Some(children);
        self
    }

    pub fn is(&self, node_type: &str) -> bool {
        self.node_type == node_type
    }

    /// Child nodes, empty when `content` is absent.
    pub fn children(&self) -> &[Node] {
        self.content.as_deref().unwrap_or(&[])
    }

    pub fn has_content(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref().and_then(|a| a.get(key))
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attr(key).and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(Value::as_str)
    }

    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        self.attr(key).and_then(Value::as_bool)
    }
}
