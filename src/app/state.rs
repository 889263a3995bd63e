use crate::picker::SelectedFile;
use crate::upload::{ProgressEvent, UploadItem, UploadProgress, UploadStatus};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long the success message stays up before the widget returns to idle.
pub const RESET_DELAY: Duration = Duration::from_secs(3);

/// Selection, progress and status of the upload widget.
///
/// Every transition is a plain method so the widget's behavior can be driven
/// without a UI.
#[derive(Debug, Default)]
pub struct WidgetState {
    files: Vec<SelectedFile>,
    progress: UploadProgress,
    status: UploadStatus,
    succeeded_at: Option<Instant>,
    last_error: Option<String>,
}

impl WidgetState {
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn progress(&self) -> &UploadProgress {
        &self.progress
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.status == UploadStatus::Uploading
    }

    /// Replaces the selection with a freshly accepted batch.
    pub fn accept_files(&mut self, files: Vec<SelectedFile>) {
        if self.is_uploading() {
            warn!(
                "Ignoring {} file(s) selected while an upload is in flight",
                files.len()
            );
            return;
        }

        debug!("Selection replaced with {} file(s)", files.len());
        self.files = files;
        self.progress.clear();
        if self.status == UploadStatus::Error {
            self.dismiss_error();
        }
    }

    pub fn remove_file(&mut self, index: usize) -> Option<SelectedFile> {
        if self.is_uploading() || index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        self.progress.remove(&removed.name);
        debug!("Removed '{}' from selection", removed.name);
        Some(removed)
    }

    /// Moves to `Uploading` and returns the batch to send, or `None` when there
    /// is nothing to upload or an upload is already running.
    pub fn begin_upload(&mut self) -> Option<Vec<UploadItem>> {
        if self.files.is_empty() {
            debug!("Upload requested with no files selected");
            return None;
        }
        if self.is_uploading() {
            return None;
        }

        self.status = UploadStatus::Uploading;
        self.progress.clear();
        self.last_error = None;
        self.succeeded_at = None;
        Some(self.files.iter().map(SelectedFile::to_upload_item).collect())
    }

    pub fn record_progress(&mut self, event: &ProgressEvent) {
        if self.is_uploading() {
            self.progress.record(event);
        }
    }

    pub fn upload_succeeded(&mut self, now: Instant) {
        if !self.is_uploading() {
            return;
        }
        info!("Upload of {} file(s) succeeded", self.files.len());
        self.status = UploadStatus::Success;
        self.files.clear();
        self.succeeded_at = Some(now);
    }

    pub fn upload_failed(&mut self, message: impl Into<String>) {
        if !self.is_uploading() {
            return;
        }
        self.status = UploadStatus::Error;
        self.last_error = Some(message.into());
    }

    pub fn cancel_upload(&mut self) {
        if self.is_uploading() {
            info!("Upload cancelled by user");
            self.status = UploadStatus::Idle;
            self.progress.clear();
        }
    }

    pub fn dismiss_error(&mut self) {
        if self.status == UploadStatus::Error {
            self.status = UploadStatus::Idle;
            self.last_error = None;
        }
    }

    /// Time left before the success state resets, if it is showing.
    pub fn reset_remaining(&self, now: Instant) -> Option<Duration> {
        match (self.status, self.succeeded_at) {
            (UploadStatus::Success, Some(at)) => {
                Some(RESET_DELAY.saturating_sub(now.saturating_duration_since(at)))
            }
            _ => None,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if self.reset_remaining(now) == Some(Duration::ZERO) {
            self.status = UploadStatus::Idle;
            self.succeeded_at = None;
            self.progress.clear();
        }
    }

    /// Fraction of the current batch sent so far.
    pub fn get_progress_percentage(&self) -> f32 {
        match self.status {
            UploadStatus::Uploading => self
                .progress
                .overall(self.files.iter().map(|file| file.name.as_str())),
            UploadStatus::Success => 1.0,
            UploadStatus::Idle | UploadStatus::Error => 0.0,
        }
    }

    pub fn get_status_text(&self) -> Option<&'static str> {
        match self.status {
            UploadStatus::Idle => None,
            UploadStatus::Uploading => Some("Uploading..."),
            UploadStatus::Success => Some("Upload successful!"),
            UploadStatus::Error => Some("Upload failed. Please try again."),
        }
    }
}
