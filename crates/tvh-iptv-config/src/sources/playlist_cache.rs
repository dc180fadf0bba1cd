use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use super::{PlaylistListing, SourceResolver};
use crate::errors::AppResult;

const CACHE_FILE_PREFIX: &str = "playlist_";
const CACHE_FILE_SUFFIX: &str = ".json";

/// In-process cache of provider listings keyed by playlist id
#[derive(Debug, Default)]
pub struct PlaylistCache {
    listings: RwLock<HashMap<i32, Arc<PlaylistListing>>>,
}

impl PlaylistCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached listing of one playlist
    pub fn insert(&self, playlist_id: i32, listing: PlaylistListing) {
        self.write_listings().insert(playlist_id, Arc::new(listing));
    }

    pub fn remove(&self, playlist_id: i32) {
        self.write_listings().remove(&playlist_id);
    }

    pub fn len(&self) -> usize {
        self.read_listings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload every `playlist_<id>.json` snapshot found in `dir`.
    ///
    /// Playlists whose file disappeared are dropped from the cache. Files that
    /// fail to parse are skipped with a warning and keep their previous entry.
    pub async fn reload_from_dir(&self, dir: &Path) -> AppResult<usize> {
        if !tokio::fs::try_exists(dir).await? {
            debug!("Playlist cache directory {} does not exist", dir.display());
            self.write_listings().clear();
            return Ok(0);
        }

        let mut loaded: HashMap<i32, Arc<PlaylistListing>> = HashMap::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(playlist_id) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_cache_file_name)
            else {
                continue;
            };

            match Self::read_listing(&path).await {
                Ok(listing) => {
                    loaded.insert(playlist_id, Arc::new(listing));
                }
                Err(e) => {
                    warn!("Skipping unreadable playlist cache {}: {}", path.display(), e);
                    if let Some(previous) = self.listing(playlist_id) {
                        loaded.insert(playlist_id, previous);
                    }
                }
            }
        }

        let count = loaded.len();
        *self.write_listings() = loaded;
        info!("Loaded {} playlist listings from {}", count, dir.display());
        Ok(count)
    }

    async fn read_listing(path: &Path) -> AppResult<PlaylistListing> {
        let contents = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&contents)?)
    }

    // Every write swaps whole entries, so a poisoned map is still consistent.
    fn read_listings(&self) -> RwLockReadGuard<'_, HashMap<i32, Arc<PlaylistListing>>> {
        self.listings.read().unwrap_or_else(|poisoned| {
            warn!("Playlist cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_listings(&self) -> RwLockWriteGuard<'_, HashMap<i32, Arc<PlaylistListing>>> {
        self.listings.write().unwrap_or_else(|poisoned| {
            warn!("Playlist cache lock was poisoned, recovering");
            self.listings.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }
}

impl SourceResolver for PlaylistCache {
    fn listing(&self, playlist_id: i32) -> Option<Arc<PlaylistListing>> {
        self.read_listings().get(&playlist_id).cloned()
    }
}

fn parse_cache_file_name(name: &str) -> Option<i32> {
    name.strip_prefix(CACHE_FILE_PREFIX)?
        .strip_suffix(CACHE_FILE_SUFFIX)?
        .parse()
        .ok()
}
