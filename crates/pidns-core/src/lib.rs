//! Page controllers between `pidns-api` and UI consumers (the CLI).
//!
//! Each admin page is an explicit controller owning its cached data, filter
//! state, and dialogs. Rendering is a pure function of that state, so the
//! controllers run headlessly under test.
//!
//! - **[`AdminSession`]**: the shared request path. Every call goes through
//!   [`AdminSession::request`], which handles a 401 with one credential
//!   prompt and reports any other failure exactly once.
//!
//! - **[`Shell`]**: what the hosting UI provides (notifications,
//!   confirmations, credential prompts, the loading indicator).
//!
//! - **Pages**: [`EntryListManager`] (blacklist / whitelist),
//!   [`SubscriptionManager`] (block-list subscriptions),
//!   [`StatisticsViewer`] (tabbed query statistics), and
//!   [`NetworkDashboard`] (DHCP devices).
//!
//! - **[`AutoRefresh`]**: periodic reload of a [`Refreshable`] page, paused
//!   while the page is hidden.

pub mod blocklists;
pub mod clipboard;
pub mod config;
pub mod entries;
pub mod error;
pub mod export;
pub mod form;
pub mod format;
pub mod network;
pub mod refresh;
pub mod screenshot;
pub mod seq;
pub mod session;
pub mod statistics;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod ui;

// ── Primary re-exports ──────────────────────────────────────────────
pub use blocklists::{EnabledFilter, SubscriptionManager};
pub use config::SessionConfig;
pub use entries::{EntryListManager, StatusFilter};
pub use error::CoreError;
pub use export::ExportFormat;
pub use network::NetworkDashboard;
pub use refresh::{AutoRefresh, RefreshHandle, Refreshable, Visibility};
pub use screenshot::{CaptureMethod, Screenshot, ScreenshotFlow};
pub use session::AdminSession;
pub use statistics::{ChartRenderer, StatisticsViewer, Tab};
pub use ui::{NoticeLevel, Shell};

pub use pidns_api::ListKind;
pub use pidns_api::models;
