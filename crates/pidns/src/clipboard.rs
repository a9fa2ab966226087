//! Clipboard backends: the desktop clipboard tool, then OSC 52.

use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};

use base64::{Engine, engine::general_purpose::STANDARD};
use pidns_core::CoreError;
use pidns_core::clipboard::ClipboardBackend;

/// Known clipboard writers, tried in order.
const TOOLS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip.exe", &[]),
];

/// Pipes text into the first clipboard tool that accepts it.
pub struct SystemClipboard;

impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn write_text(&self, text: &str) -> Result<(), CoreError> {
        for (program, args) in TOOLS {
            let Ok(mut child) = Command::new(program)
                .args(*args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            else {
                continue;
            };
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes())?;
            }
            if child.wait()?.success() {
                return Ok(());
            }
        }
        Err(CoreError::Internal("no clipboard tool available".into()))
    }
}

/// Asks the terminal emulator to set the clipboard (OSC 52).
pub struct TerminalClipboard;

/// The escape sequence that sets the clipboard to `text`.
pub fn osc52(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

impl ClipboardBackend for TerminalClipboard {
    fn name(&self) -> &'static str {
        "osc52"
    }

    fn write_text(&self, text: &str) -> Result<(), CoreError> {
        let mut stderr = io::stderr();
        if !stderr.is_terminal() {
            return Err(CoreError::Internal("stderr is not a terminal".into()));
        }
        stderr.write_all(osc52(text).as_bytes())?;
        stderr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_wraps_base64() {
        assert_eq!(osc52("hi"), "\x1b]52;c;aGk=\x07");
    }
}
