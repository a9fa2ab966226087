// ── UI capabilities ──
//
// The controllers never draw anything themselves. Whatever hosts them (the
// CLI, a test) implements `Shell`, and the controllers hand it
// notifications, confirmation requests, credential prompts, and the
// loading indicator.

use pidns_api::Credentials;

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Host capabilities the page controllers rely on.
pub trait Shell: Send + Sync {
    /// Show a transient notification.
    fn notify(&self, level: NoticeLevel, title: &str, message: &str);

    /// Ask the user to confirm a destructive action.
    fn confirm(&self, prompt: &str) -> bool;

    /// Ask for a username and password. `None` means the user declined.
    fn prompt_credentials(&self) -> Option<Credentials>;

    /// Toggle the loading indicator.
    fn set_loading(&self, loading: bool);

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, "Success", message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, "Error", message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, "Warning", message);
    }

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, "Info", message);
    }
}

/// Keeps the loading indicator on for as long as it lives.
#[must_use = "the indicator switches off as soon as the guard is dropped"]
pub struct LoadingGuard<'a> {
    shell: &'a dyn Shell,
}

impl<'a> LoadingGuard<'a> {
    pub fn new(shell: &'a dyn Shell) -> Self {
        shell.set_loading(true);
        Self { shell }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.shell.set_loading(false);
    }
}

// ── Dialogs ─────────────────────────────────────────────────────────

/// Content that can be shown in a [`Modal`].
pub trait Dialog {
    /// Input fields in tab order. The first one takes focus on open.
    const FIELDS: &'static [&'static str];
}

/// An open/closed dialog holding its form state.
#[derive(Debug, Clone, PartialEq)]
pub struct Modal<T> {
    content: Option<T>,
    focused: Option<&'static str>,
}

impl<T> Default for Modal<T> {
    fn default() -> Self {
        Self {
            content: None,
            focused: None,
        }
    }
}

impl<T: Dialog> Modal<T> {
    /// Show the dialog with fresh content, focusing its first input.
    pub fn open(&mut self, content: T) {
        self.focused = T::FIELDS.first().copied();
        self.content = Some(content);
    }
}

impl<T> Modal<T> {
    /// Hide the dialog, handing back whatever it held.
    pub fn close(&mut self) -> Option<T> {
        self.focused = None;
        self.content.take()
    }

    pub fn is_open(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> Option<&mut T> {
        self.content.as_mut()
    }

    /// Name of the input that holds focus, if the dialog is open.
    pub fn focused(&self) -> Option<&'static str> {
        self.focused
    }
}

// ── Rendered views ──────────────────────────────────────────────────

/// A rendered table: either data rows or a single placeholder message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView<R> {
    Rows(Vec<R>),
    Placeholder(String),
}

impl<R> TableView<R> {
    pub fn rows(&self) -> &[R] {
        match self {
            Self::Rows(rows) => rows,
            Self::Placeholder(_) => &[],
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Self::Rows(_) => None,
            Self::Placeholder(msg) => Some(msg),
        }
    }

    /// Rows, or `placeholder` when there are none.
    pub fn from_rows(rows: Vec<R>, placeholder: &str) -> Self {
        if rows.is_empty() {
            Self::Placeholder(placeholder.to_owned())
        } else {
            Self::Rows(rows)
        }
    }
}
