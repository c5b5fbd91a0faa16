use anyhow::Result;
use blockpad_engine::{
    AutoSave, Block, BlockPatch, BlockProps, BlockStore, BlockType, Caret, CursorContext,
    EditKey, MenuAnchor, SLASH_COMMANDS, SaveStatus, SlashCommand, Transition, filter_commands,
    io, plain_to_markup, strip_markup,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use relative_path::RelativePathBuf;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Split an absolute document path into the root directory and file name the
/// engine's document IO expects.
pub fn locate(path: &Path) -> (PathBuf, RelativePathBuf) {
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (root, RelativePathBuf::from(name))
}

/// Text of `block` as the terminal shows and edits it. Rich blocks store escaped
/// markup; the terminal has no inline formatting, so it works on the plain text.
pub fn display_text(block: &Block) -> String {
    displayed(block.block_type, &block.content)
}

fn displayed(block_type: BlockType, content: &str) -> String {
    if block_type.has_rich_content() {
        strip_markup(content)
    } else {
        content.to_string()
    }
}

/// Interactive editing session over one document.
///
/// The caret counts characters of the displayed text, not of the stored content.
pub struct App {
    path: PathBuf,
    store: BlockStore,
    focused: String,
    caret: usize,
    autosave: AutoSave,
    seen_version: u64,
    pub should_quit: bool,
}

impl App {
    /// Open `path`, or start an empty document if it does not exist yet.
    pub fn open(path: PathBuf, debounce: Duration, interval: Duration) -> Result<Self> {
        let blocks = if path.exists() {
            let (root, name) = locate(&path);
            io::load_document(&name, &root)?
        } else {
            log::warn!("{} does not exist, starting a new document", path.display());
            Vec::new()
        };
        Ok(Self::with_store(
            path,
            BlockStore::with_blocks(blocks),
            AutoSave::new(debounce, interval),
        ))
    }

    fn with_store(path: PathBuf, mut store: BlockStore, autosave: AutoSave) -> Self {
        if store.is_empty() {
            store.add_block(None, BlockType::Text);
        }
        let focused = store.blocks()[0].id.clone();
        store.set_active_block(Some(focused.as_str()));
        let seen_version = store.version();
        Self {
            path,
            store,
            focused,
            caret: 0,
            autosave,
            seen_version,
            should_quit: false,
        }
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn focused(&self) -> &str {
        &self.focused
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.autosave.status()
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    /// Palette entries matching the current slash query.
    pub fn slash_matches(&self) -> Vec<&'static SlashCommand> {
        filter_commands(SLASH_COMMANDS, &self.store.slash_menu().query)
    }

    /// How long the event loop may block before autosave needs attention.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.autosave
            .deadline()
            .map(|d| d.saturating_duration_since(now))
            .unwrap_or(Duration::from_millis(500))
            .min(Duration::from_millis(500))
    }

    fn text(&self) -> String {
        self.store
            .get_block(&self.focused)
            .map(display_text)
            .unwrap_or_default()
    }

    /// Displayed text re-encoded as content for the focused block.
    fn stored(&self, text: &str) -> String {
        match self.store.get_block(&self.focused) {
            Some(block) if block.block_type.has_rich_content() => plain_to_markup(text),
            _ => text.to_string(),
        }
    }

    /// Caret context over the stored content, so splits and merges see real content.
    fn cursor(&self) -> CursorContext {
        let text = self.text();
        let before: String = text.chars().take(self.caret).collect();
        CursorContext::new(self.stored(&text), self.stored(&before).chars().count())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') if ctrl => self.quit(),
            KeyCode::Char('s') if ctrl => self.save(),
            KeyCode::Char('t') if ctrl => self.toggle_todo(),
            KeyCode::Char(_) if ctrl => {}
            _ if self.store.slash_menu().is_open => self.handle_menu_key(key),
            _ => self.handle_edit_key(key),
        }
        self.track_edits(now);
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let focused = self.focused.clone();
        match key.code {
            KeyCode::Char(c) => {
                let mut query = self.store.slash_menu().query.clone();
                query.push(c);
                self.store.set_slash_query(query);
            }
            KeyCode::Backspace => {
                let mut query = self.store.slash_menu().query.clone();
                if query.pop().is_some() {
                    self.store.set_slash_query(query);
                } else {
                    self.store.close_slash_menu();
                }
            }
            KeyCode::Esc => {
                let cursor = self.cursor();
                self.store.handle_key(&focused, EditKey::Escape, &cursor, None);
            }
            KeyCode::Enter => {
                let cursor = self.cursor();
                let transition =
                    self.store
                        .handle_key(&focused, EditKey::Enter { shift: false }, &cursor, None);
                if transition == Transition::SwallowForSlashMenu {
                    match self.slash_matches().first() {
                        Some(command) => {
                            self.store.execute_slash_command(command);
                        }
                        None => self.store.close_slash_menu(),
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let edit_key = match key.code {
            KeyCode::Char('/') => EditKey::Slash,
            KeyCode::Esc => EditKey::Escape,
            KeyCode::Enter => EditKey::Enter { shift },
            KeyCode::Backspace => EditKey::Backspace,
            KeyCode::Up => EditKey::ArrowUp,
            KeyCode::Down => EditKey::ArrowDown,
            _ => EditKey::Other,
        };

        let focused = self.focused.clone();
        let cursor = self.cursor();
        let anchor = MenuAnchor {
            x: self.caret as f32,
            y: self.store.get_block_index(&focused).unwrap_or(0) as f32,
            width: 1.0,
            height: 1.0,
        };
        let transition = self.store.handle_key(&focused, edit_key, &cursor, Some(anchor));
        if transition.prevents_default() {
            return;
        }

        let text = self.text();
        let len = text.chars().count();
        match key.code {
            KeyCode::Char(c) => self.insert(&c.to_string()),
            KeyCode::Enter => self.insert("\n"),
            KeyCode::Backspace if self.caret > 0 && self.caret <= len => {
                let mut chars: Vec<char> = text.chars().collect();
                chars.remove(self.caret - 1);
                self.caret -= 1;
                self.set_text(chars.into_iter().collect());
            }
            KeyCode::Left => self.caret = self.caret.saturating_sub(1),
            KeyCode::Right => self.caret = (self.caret + 1).min(len),
            KeyCode::Up | KeyCode::Home => self.caret = 0,
            KeyCode::Down | KeyCode::End => self.caret = len,
            _ => {}
        }
    }

    fn insert(&mut self, s: &str) {
        let mut text = self.text();
        let at = blockpad_engine::editing::cursor::byte_index(&text, self.caret);
        text.insert_str(at, s);
        self.caret += s.chars().count();
        self.set_text(text);
    }

    fn set_text(&mut self, text: String) {
        let focused = self.focused.clone();
        let content = self.stored(&text);
        self.store.update_block(&focused, BlockPatch::content(content));
    }

    fn toggle_todo(&mut self) {
        let Some(block) = self.store.get_block(&self.focused) else {
            return;
        };
        if block.block_type != BlockType::Todo {
            return;
        }
        let checked = !block.is_checked();
        let focused = self.focused.clone();
        self.store
            .update_block(&focused, BlockPatch::props(BlockProps::checked(checked)));
    }

    fn track_edits(&mut self, now: Instant) {
        if self.store.version() != self.seen_version {
            self.seen_version = self.store.version();
            self.autosave.note_edit(now);
        }
    }

    /// Called after each draw: applies any focus queued by the last edit. Returns
    /// whether the caret moved to another place and the view should redraw.
    pub fn after_render(&mut self) -> bool {
        if let Some(focus) = self.store.commit_render() {
            let block = self.store.get_block(&focus.block_id);
            let len = block.map(|b| display_text(b).chars().count()).unwrap_or(0);
            self.caret = match (focus.caret, block) {
                (Caret::Start, _) => 0,
                (Caret::Offset(n), Some(b)) => {
                    let prefix: String = b.content.chars().take(n).collect();
                    displayed(b.block_type, &prefix).chars().count().min(len)
                }
                _ => len,
            };
            self.focused = focus.block_id;
            true
        } else if self.store.get_block(&self.focused).is_none()
            && let Some(first) = self.store.blocks().first()
        {
            self.focused = first.id.clone();
            self.caret = 0;
            true
        } else {
            false
        }
    }

    pub fn tick(&mut self, now: Instant) {
        let (root, name) = locate(&self.path);
        let blocks = self.store.blocks();
        self.autosave
            .save_if_due(now, || io::save_document(&name, &root, blocks));
    }

    pub fn save(&mut self) {
        let (root, name) = locate(&self.path);
        let blocks = self.store.blocks();
        self.autosave
            .save_now(|| io::save_document(&name, &root, blocks));
    }

    fn quit(&mut self) {
        if self.autosave.is_dirty() {
            self.save();
        }
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpad_engine::create_block_with_content;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn press(app: &mut App, code: KeyCode) {
        press_with(app, code, KeyModifiers::NONE);
    }

    fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_key_event(KeyEvent::new(code, modifiers), Instant::now());
        app.after_render();
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app_in(dir: &TempDir, contents: &[&str]) -> App {
        let blocks = contents
            .iter()
            .map(|c| create_block_with_content(BlockType::Text, *c))
            .collect();
        App::with_store(
            dir.path().join("doc.json"),
            BlockStore::with_blocks(blocks),
            AutoSave::new(Duration::from_millis(10), Duration::from_secs(1)),
        )
    }

    fn contents(app: &App) -> Vec<String> {
        app.store()
            .blocks()
            .iter()
            .map(|b| b.content.clone())
            .collect()
    }

    #[test]
    fn locate_splits_root_and_name() {
        let (root, name) = locate(Path::new("/notes/daily/today.md"));
        assert_eq!(root, PathBuf::from("/notes/daily"));
        assert_eq!(name.as_str(), "today.md");
    }

    #[test]
    fn typing_and_enter_build_blocks() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &[]);

        type_str(&mut app, "hello");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "world");

        assert_eq!(contents(&app), vec!["hello", "world"]);
        assert_eq!(app.caret(), 5);
        assert!(app.is_dirty());
    }

    #[test]
    fn enter_mid_text_splits_and_backspace_merges() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &["ABCD"]);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);

        press(&mut app, KeyCode::Enter);
        assert_eq!(contents(&app), vec!["AB", "CD"]);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(contents(&app), vec!["ABCD"]);
        assert_eq!(app.caret(), 2);
    }

    #[test]
    fn slash_menu_filters_and_converts_empty_block() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &[""]);

        press(&mut app, KeyCode::Char('/'));
        assert!(app.store().slash_menu().is_open);
        type_str(&mut app, "todo");
        assert_eq!(app.slash_matches()[0].block_type, BlockType::Todo);
        press(&mut app, KeyCode::Enter);

        assert!(!app.store().slash_menu().is_open);
        assert_eq!(app.store().len(), 1);
        assert_eq!(app.store().blocks()[0].block_type, BlockType::Todo);

        type_str(&mut app, "ship it");
        press_with(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert!(app.store().blocks()[0].is_checked());
    }

    #[test]
    fn slash_mid_text_is_typed() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &["a"]);
        press(&mut app, KeyCode::End);

        type_str(&mut app, "/b");

        assert_eq!(contents(&app), vec!["a/b"]);
        assert!(!app.store().slash_menu().is_open);
    }

    #[test]
    fn backspace_on_empty_query_closes_menu() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &[""]);

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Backspace);

        assert!(!app.store().slash_menu().is_open);
        assert_eq!(contents(&app), vec![""]);
    }

    #[test]
    fn arrows_walk_between_blocks() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &["one", "two"]);

        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focused(), app.store().blocks()[1].id);
        assert_eq!(app.caret(), 0);

        press(&mut app, KeyCode::Up);
        assert_eq!(app.focused(), app.store().blocks()[0].id);
        assert_eq!(app.caret(), 3);
    }

    #[test]
    fn ctrl_s_writes_document() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &[""]);
        type_str(&mut app, "saved text");

        press_with(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);

        assert_eq!(app.save_status(), &SaveStatus::Saved);
        let reloaded = io::load_document(&RelativePathBuf::from("doc.json"), dir.path()).unwrap();
        assert_eq!(reloaded[0].content, "saved text");
    }

    #[test]
    fn autosave_runs_after_quiet_period() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &[""]);
        type_str(&mut app, "x");

        app.tick(Instant::now() + Duration::from_secs(2));

        assert_eq!(app.save_status(), &SaveStatus::Saved);
        assert!(dir.path().join("doc.json").exists());
    }

    #[test]
    fn quit_saves_pending_edits() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &[""]);
        type_str(&mut app, "bye");

        press_with(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);

        assert!(app.should_quit);
        assert!(dir.path().join("doc.json").exists());
    }

    #[test]
    fn typed_angle_brackets_and_ampersands_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.md");
        let mut app = App::with_store(
            path.clone(),
            BlockStore::new(),
            AutoSave::new(Duration::from_millis(10), Duration::from_secs(1)),
        );

        type_str(&mut app, "if a < b & c > d");
        assert_eq!(contents(&app), vec!["if a &lt; b &amp; c &gt; d"]);
        assert_eq!(app.caret(), 16);

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, " d");
        press_with(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "if a < b & c > d");
        let reopened = App::open(path, Duration::from_secs(1), Duration::from_secs(30)).unwrap();
        assert_eq!(
            display_text(&reopened.store().blocks()[0]),
            "if a < b & c > d"
        );
    }

    #[test]
    fn caret_stays_on_displayed_text_across_split_and_merge() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, &["a &amp; b"]);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);

        press(&mut app, KeyCode::Enter);
        assert_eq!(contents(&app), vec!["a &amp;", " b"]);

        press(&mut app, KeyCode::Backspace);
        assert_eq!(contents(&app), vec!["a &amp; b"]);
        assert_eq!(app.caret(), 3);
    }

    #[test]
    fn failed_autosave_keeps_edits_for_quit() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("notes");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut app = App::with_store(
            blocker.join("doc.json"),
            BlockStore::new(),
            AutoSave::new(Duration::from_millis(10), Duration::from_secs(1)),
        );
        type_str(&mut app, "keep me");

        app.tick(Instant::now() + Duration::from_secs(2));
        assert!(matches!(app.save_status(), SaveStatus::Error(_)));
        assert!(app.is_dirty());

        std::fs::remove_file(&blocker).unwrap();
        std::fs::create_dir(&blocker).unwrap();
        app.tick(Instant::now() + Duration::from_secs(4));
        assert!(!blocker.join("doc.json").exists());

        press_with(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);

        assert!(app.should_quit);
        assert_eq!(app.save_status(), &SaveStatus::Saved);
        let reloaded = io::load_document(&RelativePathBuf::from("doc.json"), &blocker).unwrap();
        assert_eq!(reloaded[0].content, "keep me");
    }

    #[test]
    fn open_missing_file_starts_empty_document() {
        let dir = TempDir::new().unwrap();
        let app = App::open(
            dir.path().join("new.md"),
            Duration::from_secs(1),
            Duration::from_secs(30),
        )
        .unwrap();

        assert_eq!(app.store().len(), 1);
        assert_eq!(app.save_status(), &SaveStatus::Idle);
        assert!(!app.is_dirty());
    }
}
