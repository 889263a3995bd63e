use super::UploadError;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

/// Snapshot of a selected file taken when an upload starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub file_name: String,
    pub loaded: u64,
    pub total: u64,
}

impl ProgressEvent {
    /// Rounded completion percentage, clamped to 0..=100.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let percent = (self.loaded as f64 * 100.0 / self.total as f64).round();
        percent.clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug)]
pub enum UploadEvent {
    Progress(ProgressEvent),
    Finished(Result<serde_json::Value, UploadError>),
}

/// Per-file upload percentage keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadProgress {
    percents: HashMap<String, u8>,
}

impl UploadProgress {
    pub fn record(&mut self, event: &ProgressEvent) -> u8 {
        let percent = event.percent();
        let entry = self.percents.entry(event.file_name.clone()).or_insert(0);
        // Out-of-order events never move a bar backwards
        *entry = (*entry).max(percent);
        *entry
    }

    pub fn get(&self, file_name: &str) -> Option<u8> {
        self.percents.get(file_name).copied()
    }

    pub fn remove(&mut self, file_name: &str) {
        self.percents.remove(file_name);
    }

    pub fn clear(&mut self) {
        self.percents.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.percents.is_empty()
    }

    /// Mean percentage over the given names, treating missing entries as 0.
    pub fn overall<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> f32 {
        let (sum, count) = names
            .into_iter()
            .fold((0u32, 0u32), |(sum, count), name| {
                (sum + self.get(name).unwrap_or(0) as u32, count + 1)
            });
        if count == 0 {
            0.0
        } else {
            sum as f32 / (count as f32 * 100.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, loaded: u64, total: u64) -> ProgressEvent {
        ProgressEvent {
            file_name: name.to_string(),
            loaded,
            total,
        }
    }

    #[test]
    fn percent_rounds_and_clamps() {
        assert_eq!(event("a.pdf", 0, 200).percent(), 0);
        assert_eq!(event("a.pdf", 1, 3).percent(), 33);
        assert_eq!(event("a.pdf", 2, 3).percent(), 67);
        assert_eq!(event("a.pdf", 200, 200).percent(), 100);
        assert_eq!(event("a.pdf", 500, 200).percent(), 100);
        assert_eq!(event("a.pdf", 0, 0).percent(), 100);
    }

    #[test]
    fn progress_is_monotonic_per_file() {
        let mut progress = UploadProgress::default();
        let mut last = 0;
        for loaded in [10, 40, 25, 90, 300, 100] {
            let shown = progress.record(&event("report.pdf", loaded, 100));
            assert!(shown >= last);
            assert!(shown <= 100);
            last = shown;
        }
        assert_eq!(progress.get("report.pdf"), Some(100));
        assert_eq!(progress.get("other.pdf"), None);
    }

    #[test]
    fn progress_tracks_files_independently() {
        let mut progress = UploadProgress::default();
        progress.record(&event("a.pdf", 50, 100));
        progress.record(&event("b.pdf", 10, 100));
        assert_eq!(progress.get("a.pdf"), Some(50));
        assert_eq!(progress.get("b.pdf"), Some(10));

        progress.remove("a.pdf");
        assert_eq!(progress.get("a.pdf"), None);
        assert!((progress.overall(["a.pdf", "b.pdf"]) - 0.05).abs() < f32::EPSILON);

        progress.clear();
        assert!(progress.is_empty());
        assert_eq!(progress.overall(std::iter::empty()), 0.0);
    }
}
