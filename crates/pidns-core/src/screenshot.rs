// ── Dashboard screenshot ──
//
// Capture methods are tried in order until one produces an image. The
// result sits in a modal until it is downloaded, retaken, or dismissed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::ui::{Dialog, Modal, Shell};

/// A captured image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub bytes: Vec<u8>,
    /// File extension without the dot, e.g. `"png"` or `"txt"`.
    pub extension: &'static str,
    /// Name of the method that produced it.
    pub method: &'static str,
    pub captured_at: DateTime<Utc>,
}

impl Dialog for Screenshot {
    const FIELDS: &'static [&'static str] = &[];
}

impl Screenshot {
    /// Default download name, e.g. `pidns-dashboard-20240615-120000.png`.
    pub fn file_name(&self) -> String {
        format!(
            "pidns-dashboard-{}.{}",
            self.captured_at.format("%Y%m%d-%H%M%S"),
            self.extension
        )
    }
}

/// One way of producing a screenshot.
pub trait CaptureMethod: Send + Sync {
    fn name(&self) -> &'static str;
    fn capture(&self) -> Result<Screenshot, CoreError>;
}

pub struct ScreenshotFlow {
    methods: Vec<Box<dyn CaptureMethod>>,
    modal: Modal<Screenshot>,
}

impl ScreenshotFlow {
    /// `methods` in preference order.
    pub fn new(methods: Vec<Box<dyn CaptureMethod>>) -> Self {
        Self {
            methods,
            modal: Modal::default(),
        }
    }

    pub fn modal(&self) -> &Modal<Screenshot> {
        &self.modal
    }

    /// Try each method in turn and show the first result.
    pub fn capture(&mut self, shell: &dyn Shell) -> bool {
        for method in &self.methods {
            match method.capture() {
                Ok(shot) => {
                    info!(method = method.name(), bytes = shot.bytes.len(), "screenshot captured");
                    self.modal.open(shot);
                    shell.success("Screenshot captured");
                    return true;
                }
                Err(e) => debug!(method = method.name(), error = %e, "capture method failed"),
            }
        }
        shell.error("Failed to capture screenshot");
        false
    }

    /// Write the shown screenshot to `path`. A directory gets the default
    /// file name inside it.
    pub fn download(&self, path: &Path) -> Result<PathBuf, CoreError> {
        let shot = self
            .modal
            .content()
            .ok_or_else(|| CoreError::validation("No screenshot to download"))?;
        let target = if path.is_dir() {
            path.join(shot.file_name())
        } else {
            path.to_path_buf()
        };
        std::fs::write(&target, &shot.bytes)?;
        info!(path = %target.display(), "screenshot saved");
        Ok(target)
    }

    /// Discard the shown screenshot and capture a new one.
    pub fn retake(&mut self, shell: &dyn Shell) -> bool {
        self.modal.close();
        self.capture(shell)
    }

    pub fn dismiss(&mut self) {
        self.modal.close();
    }
}
