//! File selection: drag-and-drop, the native dialog, and the accept filter.

mod preview;

pub use preview::{PreviewRegistry, PreviewUrl};

use crate::upload::UploadItem;
use crate::utils::file_size::FileSizeUtils;
use eframe::egui;
use rfd::FileDialog;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_MAX_SIZE: u64 = 10 * 1024 * 1024;

/// A file accepted by the picker, holding its preview reference for as long as
/// it stays selected.
#[derive(Debug)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    preview: PreviewUrl,
}

impl SelectedFile {
    pub fn preview(&self) -> &PreviewUrl {
        &self.preview
    }

    pub fn to_upload_item(&self) -> UploadItem {
        UploadItem {
            path: self.path.clone(),
            name: self.name.clone(),
            size: self.size,
        }
    }

    pub fn open_preview(&self) {
        let Some(path) = self.preview.path() else {
            warn!("Preview {} is no longer registered", self.preview.as_str());
            return;
        };
        if let Err(e) = open::that(&path) {
            warn!("Failed to open preview for '{}': {}", self.name, e);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("file type must be one of {0}")]
    InvalidType(String),
    #[error("file is {} (larger than {})", FileSizeUtils::format_size(*size), FileSizeUtils::format_size(*max))]
    TooLarge { size: u64, max: u64 },
    #[error("another selected file has the same name")]
    DuplicateName,
    #[error("file could not be read: {0}")]
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    /// MIME type to accepted extensions (with leading dot).
    pub accept: BTreeMap<String, Vec<String>>,
    pub max_size: u64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            accept: BTreeMap::from([("application/pdf".to_string(), vec![".pdf".to_string()])]),
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl PickerConfig {
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    fn extensions(&self) -> impl Iterator<Item = &str> {
        self.accept
            .values()
            .flatten()
            .map(|ext| ext.trim_start_matches('.'))
    }

    pub fn check(&self, name: &str, size: u64) -> Result<(), Rejection> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        if !self.extensions().any(|ext| ext.eq_ignore_ascii_case(extension)) {
            let accepted: Vec<_> = self.accept.values().flatten().map(String::as_str).collect();
            return Err(Rejection::InvalidType(accepted.join(", ")));
        }
        if size > self.max_size {
            return Err(Rejection::TooLarge {
                size,
                max: self.max_size,
            });
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        let accepted: Vec<_> = self.extensions().map(|ext| ext.to_uppercase()).collect();
        format!(
            "{} only, up to {}",
            accepted.join(", "),
            FileSizeUtils::format_size(self.max_size)
        )
    }
}

pub struct FilePicker {
    config: PickerConfig,
    previews: PreviewRegistry,
    drag_active: bool,
}

impl FilePicker {
    pub fn new(config: PickerConfig) -> Self {
        Self {
            config,
            previews: PreviewRegistry::new(),
            drag_active: false,
        }
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    /// Tracks hovering files and returns the accepted batch when files were
    /// dropped on the window this frame.
    pub fn update(&mut self, ctx: &egui::Context) -> Option<Vec<SelectedFile>> {
        let (hovering, dropped) = ctx.input(|i| {
            let dropped: Vec<PathBuf> = i
                .raw
                .dropped_files
                .iter()
                .filter_map(|file| {
                    if file.path.is_none() {
                        debug!("Ignoring dropped file '{}' without a path", file.name);
                    }
                    file.path.clone()
                })
                .collect();
            (!i.raw.hovered_files.is_empty(), dropped)
        });
        self.drag_active = hovering;

        if dropped.is_empty() {
            None
        } else {
            Some(self.accept_paths(dropped))
        }
    }

    pub fn open_dialog(&self) -> Option<Vec<SelectedFile>> {
        let extensions: Vec<&str> = self.config.extensions().collect();
        let paths = FileDialog::new()
            .add_filter("PDF", extensions.as_slice())
            .pick_files()?;
        Some(self.accept_paths(paths))
    }

    pub fn accept_paths(&self, paths: Vec<PathBuf>) -> Vec<SelectedFile> {
        let mut seen = HashSet::new();
        let mut accepted = Vec::new();

        for path in paths {
            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();

            match self.inspect(&path, &name, &seen) {
                Ok(size) => {
                    seen.insert(name.clone());
                    let preview = self.previews.create(&path);
                    accepted.push(SelectedFile {
                        path,
                        name,
                        size,
                        preview,
                    });
                }
                Err(rejection) => warn!("Rejected '{}': {}", path.display(), rejection),
            }
        }

        debug!("Accepted {} file(s)", accepted.len());
        accepted
    }

    fn inspect(&self, path: &Path, name: &str, seen: &HashSet<String>) -> Result<u64, Rejection> {
        let metadata = std::fs::metadata(path).map_err(|e| Rejection::Unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(Rejection::Unreadable("not a regular file".to_string()));
        }
        self.config.check(name, metadata.len())?;
        if seen.contains(name) {
            return Err(Rejection::DuplicateName);
        }
        Ok(metadata.len())
    }
}
