//! In-memory cache of resolved environments.

use super::descriptor::EnvironmentDescriptor;
use super::resolver::ExecutionConfiguration;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Identity of a resolution: the root plus every configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

#[derive(Serialize)]
struct KeyMaterial<'a> {
    root: &'a Path,
    config: &'a ExecutionConfiguration,
}

impl CacheKey {
    pub fn new(root: &Path, config: &ExecutionConfiguration) -> Self {
        let material = serde_json::to_string(&KeyMaterial { root, config })
            .unwrap_or_else(|_| format!("{}|{:?}", root.display(), config));
        let hash = Sha256::digest(material.as_bytes());
        Self(hex::encode(&hash[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolved descriptors keyed by [`CacheKey`].
///
/// Entries live until [`ResolutionCache::clear`]; there is no expiry.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<CacheKey, Arc<EnvironmentDescriptor>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<EnvironmentDescriptor>> {
        self.entries.get(key).cloned()
    }

    /// Store a descriptor and return the shared handle.
    pub fn insert(
        &mut self,
        key: CacheKey,
        descriptor: EnvironmentDescriptor,
    ) -> Arc<EnvironmentDescriptor> {
        let shared = Arc::new(descriptor);
        self.entries.insert(key, Arc::clone(&shared));
        shared
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
