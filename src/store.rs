use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Immutable copy of the letter text at one instant. Cloning is cheap, and
/// later edits to the store never show up in an existing snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Snapshot {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Snapshot {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for Snapshot {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    /// A live view owns the displayed text and writes every change back.
    Editing,
}

/// Single source of truth for the letter text.
///
/// `load` replaces the content from outside (a freshly generated letter or a
/// reset), view changes replace it from the editor, and `snapshot` hands the
/// current value to exporters. None of these operations can fail.
#[derive(Debug, Default)]
pub struct EditableTextStore {
    text: String,
    state: EditState,
    revision: u64,
}

impl EditableTextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.load(text);
        store
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == EditState::Editing
    }

    /// Bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the content and ends any edit session.
    pub fn load(&mut self, text: impl Into<String>) {
        self.set_text(text.into());
        if self.state == EditState::Editing {
            tracing::debug!("edit session discarded by load");
        }
        self.state = EditState::Idle;
    }

    /// Opens an edit session and returns the text the view starts from.
    pub fn begin_edit(&mut self) -> &str {
        if self.state == EditState::Idle {
            self.state = EditState::Editing;
            tracing::debug!(revision = self.revision, "edit session started");
        }
        &self.text
    }

    /// Records the full text of the view after an input event. A change that
    /// arrives while idle opens an edit session first.
    pub fn on_view_change(&mut self, new_text: impl Into<String>) {
        if self.state == EditState::Idle {
            self.begin_edit();
        }
        self.set_text(new_text.into());
    }

    /// Closes the edit session, keeping whatever the view last reported.
    pub fn end_edit(&mut self) {
        if self.state == EditState::Editing {
            self.state = EditState::Idle;
            tracing::debug!(revision = self.revision, "edit session ended");
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self.text.as_str())
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
        self.revision += 1;
    }
}
