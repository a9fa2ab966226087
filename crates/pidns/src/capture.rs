//! Screenshot capture methods for the devices dashboard.
//!
//! The rendered dashboard text is preferred. When the dashboard has
//! nothing to show, a still frame of the screen is grabbed with whichever
//! screenshot tool is installed.

use std::process::Command;

use chrono::Utc;
use pidns_core::{CaptureMethod, CoreError, Screenshot};

/// The dashboard as it was last rendered in the terminal.
pub struct RenderCapture {
    text: Option<String>,
}

impl RenderCapture {
    pub fn new(text: Option<String>) -> Self {
        Self { text }
    }
}

impl CaptureMethod for RenderCapture {
    fn name(&self) -> &'static str {
        "render"
    }

    fn capture(&self) -> Result<Screenshot, CoreError> {
        let text = self.text.as_deref().ok_or_else(|| CoreError::Capture {
            message: "dashboard has not been rendered".into(),
        })?;
        Ok(Screenshot {
            bytes: format!("{text}\n").into_bytes(),
            extension: "txt",
            method: self.name(),
            captured_at: Utc::now(),
        })
    }
}

/// Screenshot tools that write a PNG to stdout.
const SCREEN_TOOLS: &[(&str, &[&str])] = &[
    ("grim", &["-"]),
    ("maim", &[]),
    ("import", &["-window", "root", "png:-"]),
];

/// One still frame of the whole screen.
pub struct ScreenCapture;

impl CaptureMethod for ScreenCapture {
    fn name(&self) -> &'static str {
        "screen"
    }

    fn capture(&self) -> Result<Screenshot, CoreError> {
        for (program, args) in SCREEN_TOOLS {
            match Command::new(program).args(*args).output() {
                Ok(out) if out.status.success() && !out.stdout.is_empty() => {
                    return Ok(Screenshot {
                        bytes: out.stdout,
                        extension: "png",
                        method: self.name(),
                        captured_at: Utc::now(),
                    });
                }
                Ok(out) => tracing::debug!(program, status = %out.status, "screen capture failed"),
                Err(e) => tracing::debug!(program, error = %e, "screen capture tool unavailable"),
            }
        }
        Err(CoreError::Capture {
            message: "no screen capture tool available".into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn render_capture_needs_text() {
        assert!(RenderCapture::new(None).capture().is_err());

        let shot = RenderCapture::new(Some("Devices: 3".into())).capture().unwrap();
        assert_eq!(shot.bytes, b"Devices: 3\n");
        assert_eq!(shot.extension, "txt");
        assert!(shot.file_name().ends_with(".txt"));
    }
}
