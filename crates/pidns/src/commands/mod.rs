//! Command dispatch: bridges CLI args -> page controllers -> output formatting.

pub mod blocklists;
pub mod config_cmd;
pub mod devices;
pub mod entries;
pub mod stats;
pub mod util;

use std::sync::Arc;

use pidns_core::{AdminSession, ListKind, SessionConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;
use crate::shell::TerminalShell;

/// Everything an appliance-bound handler needs.
pub struct Ctx<'a> {
    pub global: &'a GlobalOpts,
    pub shell: Arc<TerminalShell>,
    pub config: SessionConfig,
}

impl Ctx<'_> {
    /// Session against the admin API.
    pub fn admin_session(&self) -> Result<AdminSession, CliError> {
        Ok(AdminSession::new(
            self.config.admin_client()?,
            self.shell.clone(),
        ))
    }

    /// Session against the network dashboard service.
    pub fn dashboard_session(&self) -> Result<AdminSession, CliError> {
        Ok(AdminSession::new(
            self.config.dashboard_client()?,
            self.shell.clone(),
        ))
    }

    pub fn print(&self, out: &str) {
        output::print_output(out, self.global.quiet);
    }

    /// Map a controller's success flag to the command result.
    pub fn finish(&self, ok: bool, action: &str) -> Result<(), CliError> {
        self.shell.finish(ok, action)
    }
}

/// Dispatch an appliance-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Ctx<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Blacklist(args) => entries::handle(ctx, ListKind::Blacklist, args).await,
        Command::Whitelist(args) => entries::handle(ctx, ListKind::Whitelist, args).await,
        Command::Blocklists(args) => blocklists::handle(ctx, args).await,
        Command::Stats(args) => stats::handle(ctx, args).await,
        Command::Devices(args) => devices::handle(ctx, args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
