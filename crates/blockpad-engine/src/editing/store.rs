use crate::convert::convert_content;
use crate::models::{Block, BlockPatch, BlockType, create_block, default_props};

use super::cursor::CursorContext;
use super::keys::{EditKey, Neighbours, Transition, decide};
use super::slash::SlashCommand;

/// Screen rectangle of the focused block, used to anchor the slash menu.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MenuAnchor {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Slash menu fields. Always reset together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlashMenuState {
    pub is_open: bool,
    pub query: String,
    pub position: Option<MenuAnchor>,
}

/// Where the caret goes when a block receives focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caret {
    Start,
    End,
    /// Character offset into the block's content.
    Offset(usize),
}

/// Focus placement waiting for the view to finish rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub block_id: String,
    pub caret: Caret,
}

/// The block list of one editing session plus its focus state.
///
/// A single owner mutates the store synchronously. Focus changes produced by edits
/// are not applied immediately: they wait in a queue until the view calls
/// [`BlockStore::commit_render`], so a block is never focused before it has been
/// rendered.
#[derive(Debug, Clone, Default)]
pub struct BlockStore {
    blocks: Vec<Block>,
    active_block_id: Option<String>,
    slash_menu: SlashMenuState,
    pending_focus: Option<FocusRequest>,
    /// Incremented on each block list mutation (enables change detection)
    version: u64,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `blocks`. Accepts any sequence, including an empty one.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        let mut store = Self::new();
        store.set_blocks(blocks);
        store
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get_block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Replace the entire block list (document load).
    pub fn set_blocks(&mut self, blocks: Vec<Block>) {
        log::debug!("set_blocks: {} blocks", blocks.len());
        self.blocks = blocks;
        self.bump();
    }

    /// Insert a new block of `block_type` after `after_id` and return its id.
    ///
    /// A `None` anchor, or one that no longer resolves, inserts at the head.
    pub fn add_block(&mut self, after_id: Option<&str>, block_type: BlockType) -> String {
        self.insert_block(after_id, create_block(block_type))
    }

    fn insert_block(&mut self, after_id: Option<&str>, block: Block) -> String {
        let position = match after_id {
            Some(id) => match self.get_block_index(id) {
                Some(index) => index + 1,
                None => {
                    log::debug!("add_block: anchor {id} not found, inserting at head");
                    0
                }
            },
            None => 0,
        };
        let id = block.id.clone();
        log::debug!("add_block: {} {} at {position}", block.block_type, id);
        self.blocks.insert(position, block);
        self.bump();
        id
    }

    /// Merge `patch` into the block with `id`. Unknown ids are ignored.
    pub fn update_block(&mut self, id: &str, patch: BlockPatch) {
        match self.blocks.iter_mut().find(|b| b.id == id) {
            Some(block) => {
                block.apply(patch);
                self.bump();
            }
            None => log::debug!("update_block: {id} not found"),
        }
    }

    /// Remove the block with `id`, unless it is the only block left.
    pub fn delete_block(&mut self, id: &str) {
        if self.blocks.len() <= 1 {
            log::debug!("delete_block: refusing to delete the last block");
            return;
        }
        if let Some(index) = self.get_block_index(id) {
            self.blocks.remove(index);
            self.bump();
        }
    }

    /// Move the block at `from` so that it ends up at `to` (remove, then insert).
    /// Out-of-range indices leave the list untouched.
    pub fn move_block(&mut self, from: usize, to: usize) {
        if from >= self.blocks.len() || to >= self.blocks.len() {
            log::debug!("move_block: {from} -> {to} out of range");
            return;
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        self.bump();
    }

    pub fn get_block_index(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn get_previous_block_id(&self, id: &str) -> Option<String> {
        let index = self.get_block_index(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.blocks.get(i))
            .map(|b| b.id.clone())
    }

    pub fn get_next_block_id(&self, id: &str) -> Option<String> {
        let index = self.get_block_index(id)?;
        self.blocks.get(index + 1).map(|b| b.id.clone())
    }

    pub fn active_block_id(&self) -> Option<&str> {
        self.active_block_id.as_deref()
    }

    /// Point focus at `id`. The id is not validated; a stale id just renders as
    /// nothing focused.
    pub fn set_active_block(&mut self, id: Option<&str>) {
        self.active_block_id = id.map(str::to_string);
    }

    /// Change the type of block `id`, resetting props to the new type's defaults.
    /// Content is kept verbatim.
    pub fn convert_block_type(&mut self, id: &str, block_type: BlockType) {
        if let Some(block) = self.blocks.iter_mut().find(|b| b.id == id) {
            log::debug!("convert_block_type: {id} {} -> {block_type}", block.block_type);
            block.block_type = block_type;
            block.props = default_props(block_type);
            block.touch();
            self.bump();
        }
    }

    pub fn slash_menu(&self) -> &SlashMenuState {
        &self.slash_menu
    }

    pub fn open_slash_menu(&mut self, anchor: MenuAnchor) {
        self.slash_menu = SlashMenuState {
            is_open: true,
            query: String::new(),
            position: Some(anchor),
        };
    }

    pub fn set_slash_query(&mut self, query: impl Into<String>) {
        if self.slash_menu.is_open {
            self.slash_menu.query = query.into();
        }
    }

    /// Close the menu and forget its query and position. Idempotent.
    pub fn close_slash_menu(&mut self) {
        self.slash_menu = SlashMenuState::default();
    }

    /// Run a palette command against the active block.
    ///
    /// An empty active block is converted in place; otherwise a new block of the
    /// command's type is inserted after it. Returns the id of the affected block and
    /// queues focus onto it.
    pub fn execute_slash_command(&mut self, command: &SlashCommand) -> String {
        let active = self
            .active_block_id
            .clone()
            .filter(|id| self.get_block_index(id).is_some());

        let target = match active {
            Some(id) if self.get_block(&id).is_some_and(Block::is_empty) => {
                self.convert_block_type(&id, command.block_type);
                id
            }
            anchor => self.add_block(anchor.as_deref(), command.block_type),
        };

        self.close_slash_menu();
        self.schedule_focus(&target, Caret::Start);
        target
    }

    /// Handle a key press in block `block_id`.
    ///
    /// Decides the transition, applies at most one block list mutation and queues
    /// the resulting focus change. The returned transition tells the view whether
    /// to suppress its default key handling.
    pub fn handle_key(
        &mut self,
        block_id: &str,
        key: EditKey,
        cursor: &CursorContext,
        anchor: Option<MenuAnchor>,
    ) -> Transition {
        let neighbours = Neighbours {
            previous: self.get_previous_block_id(block_id),
            next: self.get_next_block_id(block_id),
        };
        let transition = decide(key, cursor, self.slash_menu.is_open, &neighbours);
        if transition.prevents_default() {
            log::debug!("handle_key: {key:?} in {block_id} -> {transition:?}");
        }
        self.apply_transition(block_id, &transition, anchor);
        transition
    }

    fn apply_transition(
        &mut self,
        block_id: &str,
        transition: &Transition,
        anchor: Option<MenuAnchor>,
    ) {
        match transition {
            Transition::OpenSlashMenu => {
                self.set_active_block(Some(block_id));
                self.open_slash_menu(anchor.unwrap_or_default());
            }
            Transition::CloseSlashMenu => self.close_slash_menu(),
            Transition::SwallowForSlashMenu | Transition::PassThrough => {}
            Transition::Split { before, after } => {
                let Some(source) = self.get_block(block_id).map(|b| b.block_type) else {
                    return;
                };
                self.update_block(block_id, BlockPatch::content(before.clone()));
                let mut block = create_block(BlockType::Text);
                block.content = convert_content(after, source, BlockType::Text);
                let new_id = self.insert_block(Some(block_id), block);
                self.schedule_focus(&new_id, Caret::Start);
            }
            Transition::InsertAfter => {
                let new_id = self.add_block(Some(block_id), BlockType::Text);
                self.schedule_focus(&new_id, Caret::Start);
            }
            Transition::DeleteAndFocusPrevious { previous } => {
                self.delete_block(block_id);
                self.schedule_focus(previous, Caret::End);
            }
            Transition::MergeIntoPrevious { previous } => {
                let Some((current, current_type)) = self
                    .get_block(block_id)
                    .map(|b| (b.content.clone(), b.block_type))
                else {
                    return;
                };
                let Some((prior, prior_type)) = self
                    .get_block(previous)
                    .map(|b| (b.content.clone(), b.block_type))
                else {
                    return;
                };
                let seam = prior.chars().count();
                let merged = prior + &convert_content(&current, current_type, prior_type);
                self.update_block(previous, BlockPatch::content(merged));
                self.delete_block(block_id);
                self.schedule_focus(previous, Caret::Offset(seam));
            }
            Transition::FocusPrevious { previous } => self.schedule_focus(previous, Caret::End),
            Transition::FocusNext { next } => self.schedule_focus(next, Caret::Start),
        }
    }

    /// Queue focus for the next render commit. A later request replaces an earlier one.
    pub fn schedule_focus(&mut self, block_id: &str, caret: Caret) {
        self.pending_focus = Some(FocusRequest {
            block_id: block_id.to_string(),
            caret,
        });
    }

    pub fn pending_focus(&self) -> Option<&FocusRequest> {
        self.pending_focus.as_ref()
    }

    /// Post-render synchronization point.
    ///
    /// The view calls this after it has drawn the current block list. Any queued
    /// focus request is released, becomes the active block, and is returned so the
    /// view can place the caret.
    pub fn commit_render(&mut self) -> Option<FocusRequest> {
        let request = self.pending_focus.take()?;
        self.active_block_id = Some(request.block_id.clone());
        Some(request)
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::slash::{SLASH_COMMANDS, filter_commands};
    use crate::models::{BlockProps, create_block_with_content};
    use pretty_assertions::assert_eq;

    fn store_with(contents: &[&str]) -> BlockStore {
        BlockStore::with_blocks(
            contents
                .iter()
                .map(|c| create_block_with_content(BlockType::Text, *c))
                .collect(),
        )
    }

    fn contents(store: &BlockStore) -> Vec<&str> {
        store.blocks().iter().map(|b| b.content.as_str()).collect()
    }

    fn id_at(store: &BlockStore, index: usize) -> String {
        store.blocks()[index].id.clone()
    }

    #[test]
    fn add_block_after_anchor() {
        let mut store = store_with(&["a", "b"]);
        let first = id_at(&store, 0);

        let id = store.add_block(Some(&first), BlockType::H2);

        assert_eq!(store.get_block_index(&id), Some(1));
        assert_eq!(store.blocks()[1].block_type, BlockType::H2);
        assert_eq!(contents(&store), vec!["a", "", "b"]);
    }

    #[test]
    fn add_block_without_anchor_goes_to_head() {
        let mut store = store_with(&["a"]);
        let id = store.add_block(None, BlockType::Text);
        assert_eq!(store.get_block_index(&id), Some(0));
    }

    #[test]
    fn add_block_with_stale_anchor_goes_to_head() {
        let mut store = store_with(&["a", "b"]);
        let id = store.add_block(Some("gone"), BlockType::Todo);
        assert_eq!(store.get_block_index(&id), Some(0));
        assert_eq!(store.blocks()[0].props, Some(BlockProps::checked(false)));
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut store = store_with(&["a"]);
        let version = store.version();
        store.update_block("missing", BlockPatch::content("x"));
        assert_eq!(contents(&store), vec!["a"]);
        assert_eq!(store.version(), version);
    }

    #[test]
    fn delete_never_empties_the_document() {
        let mut store = store_with(&["a", "b", "c"]);
        for _ in 0..5 {
            let id = id_at(&store, 0);
            store.delete_block(&id);
        }
        assert_eq!(store.len(), 1);
        assert_eq!(contents(&store), vec!["c"]);
    }

    #[test]
    fn move_block_uses_splice_semantics() {
        let mut store = store_with(&["a", "b", "c", "d"]);
        store.move_block(0, 2);
        assert_eq!(contents(&store), vec!["b", "c", "a", "d"]);
        store.move_block(3, 0);
        assert_eq!(contents(&store), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn move_block_out_of_range_is_ignored() {
        let mut store = store_with(&["a", "b"]);
        store.move_block(0, 5);
        assert_eq!(contents(&store), vec!["a", "b"]);
    }

    #[test]
    fn adjacency_queries() {
        let store = store_with(&["a", "b", "c"]);
        let (a, b, c) = (id_at(&store, 0), id_at(&store, 1), id_at(&store, 2));

        assert_eq!(store.get_previous_block_id(&a), None);
        assert_eq!(store.get_previous_block_id(&b), Some(a.clone()));
        assert_eq!(store.get_next_block_id(&b), Some(c.clone()));
        assert_eq!(store.get_next_block_id(&c), None);
        assert_eq!(store.get_block_index("nope"), None);
        assert_eq!(store.get_next_block_id("nope"), None);
    }

    #[test]
    fn set_active_block_accepts_stale_ids() {
        let mut store = store_with(&["a"]);
        store.set_active_block(Some("ghost"));
        assert_eq!(store.active_block_id(), Some("ghost"));
        store.set_active_block(None);
        assert_eq!(store.active_block_id(), None);
    }

    #[test]
    fn convert_keeps_content_and_resets_props() {
        let mut store = store_with(&["<b>hi</b>"]);
        let id = id_at(&store, 0);

        store.convert_block_type(&id, BlockType::Todo);
        assert_eq!(store.blocks()[0].props, Some(BlockProps::checked(false)));

        store.update_block(&id, BlockPatch::props(BlockProps::checked(true)));
        store.convert_block_type(&id, BlockType::H1);

        let block = &store.blocks()[0];
        assert_eq!(block.block_type, BlockType::H1);
        assert_eq!(block.props, None);
        assert_eq!(block.content, "<b>hi</b>");
    }

    #[test]
    fn split_and_merge_reencode_across_plain_and_rich_blocks() {
        let mut store = BlockStore::with_blocks(vec![
            create_block_with_content(BlockType::Text, "a &amp; "),
            create_block_with_content(BlockType::Code, "x < y"),
        ]);
        let code = id_at(&store, 1);

        store.handle_key(
            &code,
            EditKey::Enter { shift: false },
            &CursorContext::new("x < y", 2),
            None,
        );
        assert_eq!(contents(&store), vec!["a &amp; ", "x ", "&lt; y"]);
        assert_eq!(store.blocks()[2].block_type, BlockType::Text);

        let tail = id_at(&store, 2);
        store.handle_key(&tail, EditKey::Backspace, &CursorContext::new("&lt; y", 0), None);
        assert_eq!(contents(&store), vec!["a &amp; ", "x < y"]);

        store.handle_key(&code, EditKey::Backspace, &CursorContext::new("x < y", 0), None);
        assert_eq!(contents(&store), vec!["a &amp; x &lt; y"]);
        let focus = store.commit_render().unwrap();
        assert_eq!(focus.caret, Caret::Offset("a &amp; ".chars().count()));
    }

    #[test]
    fn split_then_merge_restores_content() {
        let mut store = store_with(&["before", "ABCD", "after"]);
        let id = id_at(&store, 1);

        let split = store.handle_key(
            &id,
            EditKey::Enter { shift: false },
            &CursorContext::new("ABCD", 2),
            None,
        );
        assert!(matches!(split, Transition::Split { .. }));
        assert_eq!(contents(&store), vec!["before", "AB", "CD", "after"]);

        let focus = store.commit_render().unwrap();
        assert_eq!(focus.caret, Caret::Start);
        assert_eq!(store.get_block_index(&focus.block_id), Some(2));

        store.handle_key(
            &focus.block_id,
            EditKey::Backspace,
            &CursorContext::new("CD", 0),
            None,
        );
        assert_eq!(contents(&store), vec!["before", "ABCD", "after"]);
        assert_eq!(id_at(&store, 1), id);

        let focus = store.commit_render().unwrap();
        assert_eq!(focus.block_id, id);
        assert_eq!(focus.caret, Caret::Offset(2));
    }

    #[test]
    fn enter_at_end_inserts_empty_text_block() {
        let mut store = store_with(&["a"]);
        let id = id_at(&store, 0);
        store.handle_key(
            &id,
            EditKey::Enter { shift: false },
            &CursorContext::at_end("a"),
            None,
        );
        assert_eq!(contents(&store), vec!["a", ""]);
        assert_eq!(store.blocks()[1].block_type, BlockType::Text);
    }

    #[test]
    fn backspace_on_empty_block_focuses_previous_end() {
        let mut store = store_with(&["a", ""]);
        let (a, empty) = (id_at(&store, 0), id_at(&store, 1));

        store.handle_key(&empty, EditKey::Backspace, &CursorContext::at_start(""), None);

        assert_eq!(contents(&store), vec!["a"]);
        assert_eq!(
            store.commit_render(),
            Some(FocusRequest {
                block_id: a,
                caret: Caret::End
            })
        );
    }

    #[test]
    fn focus_waits_for_render_commit() {
        let mut store = store_with(&["a", "b"]);
        let (a, b) = (id_at(&store, 0), id_at(&store, 1));
        store.set_active_block(Some(&a));

        store.handle_key(&a, EditKey::ArrowDown, &CursorContext::at_end("a"), None);

        assert_eq!(store.active_block_id(), Some(a.as_str()));
        assert!(store.pending_focus().is_some());

        store.commit_render();
        assert_eq!(store.active_block_id(), Some(b.as_str()));
        assert_eq!(store.commit_render(), None);
    }

    #[test]
    fn slash_menu_lifecycle() {
        let mut store = store_with(&[""]);
        let id = id_at(&store, 0);
        let anchor = MenuAnchor {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 18.0,
        };

        store.handle_key(&id, EditKey::Slash, &CursorContext::at_start(""), Some(anchor));
        assert!(store.slash_menu().is_open);
        assert_eq!(store.slash_menu().position, Some(anchor));

        store.set_slash_query("head");
        assert_eq!(store.slash_menu().query, "head");

        let swallowed = store.handle_key(
            &id,
            EditKey::Enter { shift: false },
            &CursorContext::at_start(""),
            None,
        );
        assert_eq!(swallowed, Transition::SwallowForSlashMenu);
        assert_eq!(store.len(), 1);

        store.handle_key(&id, EditKey::Escape, &CursorContext::at_start(""), None);
        assert_eq!(store.slash_menu(), &SlashMenuState::default());

        store.close_slash_menu();
        assert_eq!(store.slash_menu(), &SlashMenuState::default());
    }

    #[test]
    fn slash_command_converts_empty_block() {
        let mut store = store_with(&[""]);
        let id = id_at(&store, 0);
        store.set_active_block(Some(&id));
        store.open_slash_menu(MenuAnchor::default());

        let command = filter_commands(SLASH_COMMANDS, "h2")[0];
        let target = store.execute_slash_command(command);

        assert_eq!(target, id);
        assert_eq!(store.len(), 1);
        assert_eq!(store.blocks()[0].block_type, BlockType::H2);
        assert!(!store.slash_menu().is_open);
        assert_eq!(store.commit_render().map(|f| f.block_id), Some(id));
    }

    #[test]
    fn slash_command_inserts_after_non_empty_block() {
        let mut store = store_with(&["text", "tail"]);
        let id = id_at(&store, 0);
        store.set_active_block(Some(&id));

        let command = filter_commands(SLASH_COMMANDS, "divider")[0];
        let target = store.execute_slash_command(command);

        assert_eq!(store.get_block_index(&target), Some(1));
        assert_eq!(store.blocks()[1].block_type, BlockType::Divider);
        assert_eq!(store.blocks()[0].block_type, BlockType::Text);
    }
}
