//! Bundled resources: JSON files shipped alongside the application and
//! addressed by logical name rather than by URL.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Read-only lookup of bundled resources by name.
pub trait ResourceStore: Send + Sync + std::fmt::Debug {
    /// The resource bytes, or `None` if no such resource exists.
    fn read_resource(&self, name: &str) -> Option<Vec<u8>>;
}

/// Resources stored as files under a root directory.
///
/// Names are relative paths inside the root. Absolute names and names with
/// `..` components never resolve.
#[derive(Debug, Clone)]
pub struct BundleDir {
    root: PathBuf,
}

impl BundleDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || !contained {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl Default for BundleDir {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ResourceStore for BundleDir {
    fn read_resource(&self, name: &str) -> Option<Vec<u8>> {
        let Some(path) = self.resolve(name) else {
            warn!(name, "resource name escapes the bundle root");
            return None;
        };
        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!(name, bytes = bytes.len(), "gathered bundled resource");
                Some(bytes)
            }
            Err(err) => {
                debug!(name, path = %path.display(), %err, "bundled resource not readable");
                None
            }
        }
    }
}

/// Resources held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource, builder style.
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), bytes.into());
    }
}

impl ResourceStore for MemoryResources {
    fn read_resource(&self, name: &str) -> Option<Vec<u8>> {
        self.entries.get(name).cloned()
    }
}

/// Read and decode a JSON resource, treating every failure as absence.
///
/// Use [`ApiClient::load_local`](crate::ApiClient::load_local) when the
/// caller needs to know why a resource could not be loaded.
pub fn decode_resource<T: DeserializeOwned>(store: &dyn ResourceStore, name: &str) -> Option<T> {
    let bytes = store.read_resource(name)?;
    serde_json::from_slice(&bytes)
        .inspect_err(|err| debug!(name, %err, "bundled resource is not valid JSON for target"))
        .ok()
}
