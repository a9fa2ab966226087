//! Headless [`Shell`] and [`ChartRenderer`] implementations that record
//! every interaction, for driving the controllers from tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use pidns_api::Credentials;
use secrecy::SecretString;

use crate::statistics::{ChartId, ChartRenderer, HourlyChart};
use crate::ui::{NoticeLevel, Shell};

/// One observed call on a [`RecordingShell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Notice {
        level: NoticeLevel,
        title: String,
        message: String,
    },
    Confirm(String),
    CredentialPrompt,
    Loading(bool),
}

/// A shell that answers from a script and logs what was asked of it.
#[derive(Debug, Default)]
pub struct RecordingShell {
    events: Mutex<Vec<ShellEvent>>,
    decline_confirm: AtomicBool,
    credentials: Mutex<Option<(String, String)>>,
}

impl RecordingShell {
    /// Confirms everything and declines credential prompts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer "no" to every confirmation.
    pub fn declining(self) -> Self {
        self.decline_confirm.store(true, Ordering::SeqCst);
        self
    }

    /// Supply these credentials when prompted.
    pub fn with_credentials(self, username: &str, password: &str) -> Self {
        *self
            .credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some((username.into(), password.into()));
        self
    }

    pub fn events(&self) -> Vec<ShellEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notifications only, as `(level, message)`.
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ShellEvent::Notice { level, message, .. } => Some((level, message)),
                _ => None,
            })
            .collect()
    }

    pub fn prompt_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ShellEvent::CredentialPrompt))
            .count()
    }

    pub fn confirm_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ShellEvent::Confirm(_)))
            .count()
    }

    fn push(&self, event: ShellEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl Shell for RecordingShell {
    fn notify(&self, level: NoticeLevel, title: &str, message: &str) {
        self.push(ShellEvent::Notice {
            level,
            title: title.into(),
            message: message.into(),
        });
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.push(ShellEvent::Confirm(prompt.into()));
        !self.decline_confirm.load(Ordering::SeqCst)
    }

    fn prompt_credentials(&self) -> Option<Credentials> {
        self.push(ShellEvent::CredentialPrompt);
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .map(|(user, pass)| Credentials::new(user, SecretString::from(pass)))
    }

    fn set_loading(&self, loading: bool) {
        self.push(ShellEvent::Loading(loading));
    }
}

/// Chart backend that remembers which charts are live.
#[derive(Debug, Default)]
pub struct RecordingChart {
    next: u64,
    pub live: Vec<ChartId>,
    pub drawn: Vec<HourlyChart>,
    pub disposed: Vec<ChartId>,
}

impl ChartRenderer for RecordingChart {
    fn draw(&mut self, chart: &HourlyChart) -> ChartId {
        self.next += 1;
        let id = ChartId(self.next);
        self.live.push(id);
        self.drawn.push(chart.clone());
        id
    }

    fn dispose(&mut self, id: ChartId) {
        self.live.retain(|c| *c != id);
        self.disposed.push(id);
    }
}
