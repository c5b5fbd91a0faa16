/*!
 * # Block Editing Core
 *
 * A document is a flat, ordered list of typed blocks owned by a single
 * [`BlockStore`]. Everything a view needs to edit it lives here.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Owner
 * - The store is passed by `&mut` to whatever handles input; there is no global state
 * - Every mutation is synchronous and happens on the event-handling thread
 * - A document never drops below one block: deleting the last block is refused
 *
 * ### 2. Explicit Cursor Input
 * - The view reports caret state as a [`CursorContext`] value instead of the core
 *   querying a live selection
 * - [`decide`] maps a key plus cursor to a [`Transition`] without touching the store,
 *   so the split/merge/navigate rules are testable without any view
 *
 * ### 3. Mutate, Render, Focus
 * - Applying a transition performs at most one block list mutation and queues a
 *   [`FocusRequest`]
 * - The queue is released only by [`BlockStore::commit_render`], which the view calls
 *   after drawing, so focus never targets a block that has not been rendered yet
 *
 * ### 4. Derived Presentation Data
 * - Numbered list ordinals come from [`get_list_index`] on every render; nothing is stored
 * - The slash palette filters a static catalog with [`filter_commands`]
 *
 * ## Usage Pattern
 *
 * ```rust
 * use blockpad_engine::editing::*;
 * use blockpad_engine::models::{BlockType, create_block_with_content};
 *
 * let mut store = BlockStore::with_blocks(vec![create_block_with_content(BlockType::Text, "ABCD")]);
 * let id = store.blocks()[0].id.clone();
 *
 * // Enter in the middle of the text splits the block
 * let t = store.handle_key(&id, EditKey::Enter { shift: false }, &CursorContext::new("ABCD", 2), None);
 * assert!(t.prevents_default());
 *
 * // ...the view re-renders, then asks where focus should go
 * let focus = store.commit_render().unwrap();
 * assert_eq!(store.get_block_index(&focus.block_id), Some(1));
 * ```
 */

pub mod cursor;
pub mod keys;
pub mod list_index;
pub mod slash;
pub mod store;

pub use cursor::CursorContext;
pub use keys::{EditKey, Neighbours, Transition, decide};
pub use list_index::get_list_index;
pub use slash::{SLASH_COMMANDS, SlashCommand, filter_commands};
pub use store::{BlockStore, Caret, FocusRequest, MenuAnchor, SlashMenuState};
