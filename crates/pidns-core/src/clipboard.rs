// ── Clipboard ──

use tracing::debug;

use crate::error::CoreError;
use crate::ui::Shell;

/// Somewhere text can be copied to.
pub trait ClipboardBackend {
    fn name(&self) -> &'static str;
    fn write_text(&self, text: &str) -> Result<(), CoreError>;
}

/// Copy `text`, trying `primary` first and `fallback` when it is missing
/// or fails. Reports the outcome through the shell.
pub fn copy_to_clipboard(
    shell: &dyn Shell,
    primary: Option<&dyn ClipboardBackend>,
    fallback: &dyn ClipboardBackend,
    text: &str,
) -> bool {
    let copied = primary
        .into_iter()
        .chain(std::iter::once(fallback))
        .any(|backend| match backend.write_text(text) {
            Ok(()) => {
                debug!(backend = backend.name(), bytes = text.len(), "copied to clipboard");
                true
            }
            Err(e) => {
                debug!(backend = backend.name(), error = %e, "clipboard backend failed");
                false
            }
        });

    if copied {
        shell.success("Copied to clipboard");
    } else {
        shell.error("Failed to copy to clipboard");
    }
    copied
}
