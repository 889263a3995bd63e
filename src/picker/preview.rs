use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

const SCHEME: &str = "preview://";

#[derive(Default)]
struct Entries {
    next_id: u64,
    paths: HashMap<String, PathBuf>,
}

/// Process-local table of preview references to local files.
///
/// Every [`PreviewUrl`] handed out stays resolvable until it is dropped.
#[derive(Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<Entries>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, path: &Path) -> PreviewUrl {
        let mut entries = self.entries.lock();
        entries.next_id += 1;
        let url = format!("{}{}", SCHEME, entries.next_id);
        entries.paths.insert(url.clone(), path.to_path_buf());
        trace!("Created {} for {}", url, path.display());
        PreviewUrl {
            url,
            registry: self.clone(),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        self.entries.lock().paths.get(url).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.entries.lock().paths.len()
    }

    fn revoke(&self, url: &str) {
        if self.entries.lock().paths.remove(url).is_some() {
            trace!("Revoked {}", url);
        }
    }
}

/// Owned preview reference, revoked when dropped.
pub struct PreviewUrl {
    url: String,
    registry: PreviewRegistry,
}

impl PreviewUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.registry.resolve(&self.url)
    }
}

impl std::fmt::Debug for PreviewUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

impl Drop for PreviewUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}
