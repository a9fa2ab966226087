//! Terminal implementation of the core `Shell` capabilities.
//!
//! Notifications go to stderr (colored per `--color`), confirmations and
//! credential prompts use `dialoguer` / `rpassword`, and the loading
//! indicator is an `indicatif` spinner.

use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use pidns_api::Credentials;
use pidns_core::session::AUTH_REQUIRED_TITLE;
use pidns_core::{NoticeLevel, Shell};
use secrecy::SecretString;

use crate::error::{CliError, exit_code};

/// How a controller action that returned `false` should end the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The user said no; nothing went wrong.
    Cancelled,
    /// A confirmation was needed but there was nobody to ask.
    NeedsYes,
    /// A failure was shown to the user.
    Failed { code: i32 },
}

#[allow(clippy::struct_excessive_bools)]
pub struct TerminalShell {
    assume_yes: bool,
    quiet: bool,
    color: bool,
    interactive: bool,
    spinner: Mutex<Option<ProgressBar>>,
    loading_depth: AtomicUsize,
    declined: AtomicBool,
    needs_yes: AtomicBool,
    auth_declined: AtomicBool,
}

impl TerminalShell {
    pub fn new(assume_yes: bool, quiet: bool, color: bool) -> Self {
        Self {
            assume_yes,
            quiet,
            color,
            interactive: io::stdin().is_terminal() && io::stderr().is_terminal(),
            spinner: Mutex::new(None),
            loading_depth: AtomicUsize::new(0),
            declined: AtomicBool::new(false),
            needs_yes: AtomicBool::new(false),
            auth_declined: AtomicBool::new(false),
        }
    }

    /// Force non-interactive behavior regardless of the attached terminal.
    #[cfg(test)]
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Why the last action gave up, judged from what the user saw.
    pub fn outcome(&self) -> Outcome {
        if self.needs_yes.load(Ordering::SeqCst) {
            Outcome::NeedsYes
        } else if self.auth_declined.load(Ordering::SeqCst) {
            Outcome::Failed {
                code: exit_code::AUTH,
            }
        } else if self.declined.load(Ordering::SeqCst) {
            Outcome::Cancelled
        } else {
            Outcome::Failed {
                code: exit_code::GENERAL,
            }
        }
    }

    /// Turn a controller's success flag into a command result.
    pub fn finish(&self, ok: bool, action: &str) -> Result<(), CliError> {
        if ok {
            return Ok(());
        }
        match self.outcome() {
            Outcome::Cancelled => {
                self.info("Cancelled");
                Ok(())
            }
            Outcome::NeedsYes => Err(CliError::NonInteractiveRequiresYes {
                action: action.into(),
            }),
            Outcome::Failed { code } => Err(CliError::Reported { code }),
        }
    }

    /// Run `f` with the spinner hidden so prompts are not overdrawn.
    fn suspended<T>(&self, f: impl FnOnce() -> T) -> T {
        let spinner = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match spinner {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    fn print_notice(&self, level: NoticeLevel, title: &str, message: &str) {
        let text = if title.is_empty() || title == level.to_string() || title == "Success" {
            message.to_owned()
        } else {
            format!("{title}: {message}")
        };
        let line = match (level, self.color) {
            (NoticeLevel::Success, true) => format!("{} {text}", "✓".green()),
            (NoticeLevel::Error, true) => format!("{} {}", "✗".red(), text.red()),
            (NoticeLevel::Warning, true) => format!("{} {}", "!".yellow(), text.yellow()),
            (NoticeLevel::Info, true) => format!("{} {text}", "·".cyan()),
            (NoticeLevel::Success, false) => format!("✓ {text}"),
            (NoticeLevel::Error, false) => format!("✗ {text}"),
            (NoticeLevel::Warning, false) => format!("! {text}"),
            (NoticeLevel::Info, false) => format!("· {text}"),
        };
        self.suspended(|| eprintln!("{line}"));
    }
}

impl Shell for TerminalShell {
    fn notify(&self, level: NoticeLevel, title: &str, message: &str) {
        tracing::debug!(%level, title, message, "notice");
        if title == AUTH_REQUIRED_TITLE {
            self.auth_declined.store(true, Ordering::SeqCst);
        }
        let quiet_level = matches!(level, NoticeLevel::Success | NoticeLevel::Info);
        if self.quiet && quiet_level {
            return;
        }
        self.print_notice(level, title, message);
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !self.interactive {
            self.needs_yes.store(true, Ordering::SeqCst);
            return false;
        }
        let answer = self.suspended(|| {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
        });
        match answer {
            Ok(true) => true,
            Ok(false) => {
                self.declined.store(true, Ordering::SeqCst);
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "confirmation prompt failed");
                self.needs_yes.store(true, Ordering::SeqCst);
                false
            }
        }
    }

    fn prompt_credentials(&self) -> Option<Credentials> {
        if !self.interactive {
            return None;
        }
        self.suspended(|| {
            eprintln!("The appliance requires a login.");
            let username: String = dialoguer::Input::new()
                .with_prompt("Username")
                .interact_text()
                .ok()?;
            let password = rpassword::prompt_password("Password: ").ok()?;
            Some(Credentials::new(username, SecretString::from(password)))
        })
    }

    fn set_loading(&self, loading: bool) {
        if self.quiet || !io::stderr().is_terminal() {
            return;
        }
        let mut spinner = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        if loading {
            if self.loading_depth.fetch_add(1, Ordering::SeqCst) == 0 {
                let bar = ProgressBar::new_spinner();
                bar.set_style(ProgressStyle::default_spinner());
                bar.set_message("Loading...");
                bar.enable_steady_tick(Duration::from_millis(100));
                *spinner = Some(bar);
            }
        } else if self
            .loading_depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1))
            == Ok(1)
        {
            if let Some(bar) = spinner.take() {
                bar.finish_and_clear();
            }
        }
    }
}
