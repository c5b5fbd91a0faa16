/// Caret state inside the focused block, as reported by the view.
///
/// `offset` counts characters, not bytes. `at_start`/`at_end` are kept as separate
/// fields because a view with a non-collapsed selection reports them independently
/// of the offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorContext {
    pub text: String,
    pub offset: usize,
    pub at_start: bool,
    pub at_end: bool,
}

impl CursorContext {
    /// Collapsed caret at `offset`, clamped to the text length.
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        let text = text.into();
        let len = text.chars().count();
        let offset = offset.min(len);
        Self {
            text,
            offset,
            at_start: offset == 0,
            at_end: offset == len,
        }
    }

    pub fn at_start(text: impl Into<String>) -> Self {
        Self::new(text, 0)
    }

    pub fn at_end(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self::new(text, len)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Caret strictly between the first and last character.
    pub fn is_inside(&self) -> bool {
        !self.at_start && !self.at_end
    }

    /// Text before and after the caret.
    pub fn split(&self) -> (String, String) {
        let idx = byte_index(&self.text, self.offset);
        let (before, after) = self.text.split_at(idx);
        (before.to_string(), after.to_string())
    }
}

/// Byte index of the `char_offset`-th character, or the text length past the end.
pub fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
