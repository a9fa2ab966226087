// ── Periodic refresh ──
//
// Pages that show live data (the network dashboard, the statistics viewer)
// reload on a fixed period while visible. Hiding the page pauses the timer;
// showing it again starts a fresh period rather than firing immediately.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Something that can reload itself from the appliance.
pub trait Refreshable: Send {
    fn refresh(&mut self) -> impl Future<Output = ()> + Send;
}

/// Adapts an async closure into a [`Refreshable`].
pub struct Reload<F>(pub F);

impl<F, Fut> Refreshable for Reload<F>
where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = ()> + Send,
{
    fn refresh(&mut self) -> impl Future<Output = ()> + Send {
        (self.0)()
    }
}

/// Whether the page hosting the timer is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// The timer loop. Drive it with [`AutoRefresh::run`].
pub struct AutoRefresh {
    period: Duration,
    visibility: watch::Receiver<Visibility>,
    last_updated: watch::Sender<Option<DateTime<Utc>>>,
    cancel: CancellationToken,
}

/// Controls a running [`AutoRefresh`] from outside.
///
/// Dropping the handle stops the loop.
#[derive(Debug)]
pub struct RefreshHandle {
    visibility: watch::Sender<Visibility>,
    last_updated: watch::Receiver<Option<DateTime<Utc>>>,
    cancel: CancellationToken,
}

impl AutoRefresh {
    pub fn new(period: Duration) -> (Self, RefreshHandle) {
        let (visibility_tx, visibility_rx) = watch::channel(Visibility::Visible);
        let (last_tx, last_rx) = watch::channel(None);
        let cancel = CancellationToken::new();
        (
            Self {
                period,
                visibility: visibility_rx,
                last_updated: last_tx,
                cancel: cancel.clone(),
            },
            RefreshHandle {
                visibility: visibility_tx,
                last_updated: last_rx,
                cancel,
            },
        )
    }

    /// Refresh `page` every period until cancelled.
    ///
    /// The first refresh happens one full period after start; callers load
    /// the page themselves beforehand.
    pub async fn run<P: Refreshable>(mut self, page: &mut P) {
        loop {
            // Paused while hidden.
            while *self.visibility.borrow_and_update() == Visibility::Hidden {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => return,
                    changed = self.visibility.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }

            debug!(period_secs = self.period.as_secs(), "auto-refresh started");
            let mut ticker = tokio::time::interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => return,
                    changed = self.visibility.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        debug!(visibility = ?*self.visibility.borrow(), "visibility changed");
                        break;
                    }
                    _ = ticker.tick() => {
                        page.refresh().await;
                        self.last_updated.send_replace(Some(Utc::now()));
                    }
                }
            }
        }
    }
}

impl RefreshHandle {
    pub fn set_visibility(&self, visibility: Visibility) {
        self.visibility.send_replace(visibility);
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// When the timer last completed a refresh.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.last_updated.borrow()
    }

    pub fn subscribe_last_updated(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_updated.clone()
    }
}
