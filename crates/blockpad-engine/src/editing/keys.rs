//! Per-keystroke decision procedure.
//!
//! [`decide`] is pure: it looks at the key, the caret and the focused block's
//! neighbours and says what should happen. [`BlockStore::handle_key`] applies the
//! result.
//!
//! [`BlockStore::handle_key`]: crate::editing::BlockStore::handle_key

use super::cursor::CursorContext;

/// Keys the block editor intercepts. Everything else is [`EditKey::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Slash,
    Escape,
    Enter { shift: bool },
    Backspace,
    ArrowUp,
    ArrowDown,
    Other,
}

/// Positional neighbours of the focused block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbours {
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    OpenSlashMenu,
    CloseSlashMenu,
    /// The slash menu owns the key; the block list is untouched.
    SwallowForSlashMenu,
    /// Keep `before` in the current block and start a new text block holding `after`.
    Split { before: String, after: String },
    /// New empty text block after the current one.
    InsertAfter,
    DeleteAndFocusPrevious { previous: String },
    /// Append the current block onto `previous` and remove the current block.
    MergeIntoPrevious { previous: String },
    FocusPrevious { previous: String },
    FocusNext { next: String },
    /// Not intercepted; the view's default handling applies.
    PassThrough,
}

impl Transition {
    /// Whether the view must suppress its default handling of the key.
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Transition::PassThrough)
    }
}

/// Decide what a key press does. Rules are checked in order and the first match wins.
pub fn decide(
    key: EditKey,
    cursor: &CursorContext,
    slash_menu_open: bool,
    neighbours: &Neighbours,
) -> Transition {
    match key {
        EditKey::Slash if cursor.is_empty() || cursor.offset == 0 => Transition::OpenSlashMenu,
        EditKey::Escape if slash_menu_open => Transition::CloseSlashMenu,
        EditKey::Enter { shift: false } => {
            if slash_menu_open {
                Transition::SwallowForSlashMenu
            } else if cursor.is_inside() {
                let (before, after) = cursor.split();
                Transition::Split { before, after }
            } else {
                Transition::InsertAfter
            }
        }
        EditKey::Backspace => match &neighbours.previous {
            Some(previous) if cursor.is_empty() => Transition::DeleteAndFocusPrevious {
                previous: previous.clone(),
            },
            Some(previous) if cursor.at_start => Transition::MergeIntoPrevious {
                previous: previous.clone(),
            },
            _ => Transition::PassThrough,
        },
        EditKey::ArrowUp if cursor.at_start => match &neighbours.previous {
            Some(previous) => Transition::FocusPrevious {
                previous: previous.clone(),
            },
            None => Transition::PassThrough,
        },
        EditKey::ArrowDown if cursor.at_end => match &neighbours.next {
            Some(next) => Transition::FocusNext { next: next.clone() },
            None => Transition::PassThrough,
        },
        _ => Transition::PassThrough,
    }
}
