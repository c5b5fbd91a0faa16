use std::fmt::Display;
use std::time::{Duration, Instant};

/// What the UI shows about persistence. Editing never waits on it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error(String),
}

impl Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStatus::Idle => f.write_str("idle"),
            SaveStatus::Saving => f.write_str("saving"),
            SaveStatus::Saved => f.write_str("saved"),
            SaveStatus::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Debounced autosave decision.
///
/// A save becomes due once edits have been quiet for `debounce`, or once the oldest
/// unsaved edit is `interval` old, whichever comes first. All methods take the
/// current instant so the schedule is deterministic under test. A failed save is
/// reported through [`SaveStatus::Error`] and leaves the edits unsaved; the schedule
/// does not retry it until the next edit, but an explicit save always runs.
#[derive(Debug, Clone)]
pub struct AutoSave {
    debounce: Duration,
    interval: Duration,
    first_unsaved_edit: Option<Instant>,
    last_edit: Option<Instant>,
    /// Set by a failed save, cleared by the next edit.
    held: bool,
    status: SaveStatus,
}

impl AutoSave {
    pub fn new(debounce: Duration, interval: Duration) -> Self {
        Self {
            debounce,
            interval,
            first_unsaved_edit: None,
            last_edit: None,
            held: false,
            status: SaveStatus::Idle,
        }
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.first_unsaved_edit.is_some()
    }

    pub fn note_edit(&mut self, now: Instant) {
        self.first_unsaved_edit.get_or_insert(now);
        self.last_edit = Some(now);
        self.held = false;
    }

    /// The instant the pending save becomes due, if anything is unsaved and no
    /// failed save is waiting for a new edit.
    pub fn deadline(&self) -> Option<Instant> {
        if self.held {
            return None;
        }
        let first = self.first_unsaved_edit?;
        let last = self.last_edit.unwrap_or(first);
        Some((last + self.debounce).min(first + self.interval))
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.status != SaveStatus::Saving && self.deadline().is_some_and(|d| now >= d)
    }

    /// Run `save` if a save is due. Returns whether a save was attempted.
    pub fn save_if_due<E: Display>(
        &mut self,
        now: Instant,
        save: impl FnOnce() -> Result<(), E>,
    ) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.save_now(save);
        true
    }

    /// Save immediately regardless of the schedule (explicit save). Edits stay
    /// unsaved unless `save` succeeds.
    pub fn save_now<E: Display>(&mut self, save: impl FnOnce() -> Result<(), E>) {
        self.status = SaveStatus::Saving;
        match save() {
            Ok(()) => {
                self.first_unsaved_edit = None;
                self.last_edit = None;
                self.held = false;
                self.status = SaveStatus::Saved;
            }
            Err(e) => {
                log::warn!("save failed: {e}");
                self.held = true;
                self.status = SaveStatus::Error(e.to_string());
            }
        }
    }
}
