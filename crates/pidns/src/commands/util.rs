//! Shared helpers for command handlers.

use pidns_core::clipboard::{ClipboardBackend, copy_to_clipboard};

use crate::clipboard::{SystemClipboard, TerminalClipboard};
use crate::error::CliError;

use super::Ctx;

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Copy `text` to the clipboard, reporting the outcome.
pub fn copy(ctx: &Ctx<'_>, text: &str) -> Result<(), CliError> {
    let primary: &dyn ClipboardBackend = &SystemClipboard;
    let copied = copy_to_clipboard(ctx.shell.as_ref(), Some(primary), &TerminalClipboard, text);
    ctx.finish(copied, "copy")
}

/// "yes" / "no" for boolean table cells.
pub fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.into()
}
