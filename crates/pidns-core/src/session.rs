// ── Shared request path ──
//
// Every page controller goes through `AdminSession::request`, which turns
// API failures into exactly one user-visible reaction: a credential prompt
// for a 401, a notification for everything else. Callers get `None` back
// and must not report the failure again.

use std::future::Future;
use std::sync::Arc;

use pidns_api::AdminClient;
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::ui::{LoadingGuard, NoticeLevel, Shell};

/// Title and body shown when the user declines the credential prompt.
pub const AUTH_REQUIRED_TITLE: &str = "Authentication required";
pub const AUTH_REQUIRED_MESSAGE: &str =
    "Please provide valid credentials to access the ad-blocker interface.";

/// A client plus the shell that reports on its behalf.
#[derive(Clone)]
pub struct AdminSession {
    client: Arc<AdminClient>,
    shell: Arc<dyn Shell>,
}

impl AdminSession {
    pub fn new(client: Arc<AdminClient>, shell: Arc<dyn Shell>) -> Self {
        Self { client, shell }
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    pub fn shell(&self) -> &dyn Shell {
        self.shell.as_ref()
    }

    /// Turn the loading indicator on until the guard drops.
    pub fn loading(&self) -> LoadingGuard<'_> {
        LoadingGuard::new(self.shell.as_ref())
    }

    /// Await one API call, reporting any failure through the shell.
    ///
    /// A 401 clears the cached credentials and prompts once; the call is
    /// not retried, so the user re-triggers the action afterwards.
    pub async fn request<T>(
        &self,
        call: impl Future<Output = Result<T, pidns_api::Error>>,
    ) -> Option<T> {
        match call.await {
            Ok(value) => Some(value),
            Err(err) => {
                self.handle_failure(err);
                None
            }
        }
    }

    /// Report a failed call the same way `request` does.
    pub fn handle_failure(&self, err: pidns_api::Error) {
        if err.is_auth_expired() {
            if !self.reauthenticate() {
                self.shell
                    .notify(NoticeLevel::Error, AUTH_REQUIRED_TITLE, AUTH_REQUIRED_MESSAGE);
            }
            return;
        }
        self.report(&CoreError::from(err));
    }

    /// Drop the rejected credentials and ask for new ones.
    ///
    /// Returns `true` when the user supplied a non-empty username and
    /// password, which are cached for the next request.
    pub fn reauthenticate(&self) -> bool {
        warn!("credentials rejected, prompting for new ones");
        self.client.clear_credentials();

        let Some(creds) = self.shell.prompt_credentials() else {
            debug!("credential prompt declined");
            return false;
        };
        if creds.username().is_empty() || creds.password().expose_secret().is_empty() {
            debug!("credential prompt returned blank fields");
            return false;
        }
        self.client.set_credentials(creds);
        true
    }

    /// Show a failure to the user.
    ///
    /// Messages from the appliance and local validation errors are shown
    /// verbatim; transport problems get the generic fetch-failure wording.
    pub fn report(&self, err: &CoreError) {
        warn!(error = %err, "operation failed");
        match err {
            CoreError::Rejected { message } | CoreError::ValidationFailed { message } => {
                self.shell.error(message);
            }
            other => self.shell.notify(
                NoticeLevel::Error,
                "API Error",
                &format!("Failed to fetch data: {other}"),
            ),
        }
    }
}
