//! On-disk result cache for incremental rescans.
//!
//! Maps file paths to the matches produced when the path was last scanned.
//! A missing key means "not yet scanned"; an empty list means "scanned, no
//! matches". The cache is only valid while rules and file contents are
//! unchanged between runs - invalidating stale entries is the caller's
//! concern, the path alone is the key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::{info, warn};

use crate::error::CacheError;
use crate::finding::Match;
use crate::fs_util::atomic_write;

/// Minimum time between opportunistic saves while the cache is dirty.
const SAVE_INTERVAL: Duration = Duration::from_secs(10);

/// On-disk shape of the cache: both keys are always present.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    result: HashMap<String, Vec<Match>>,
    last_update: DateTime<Utc>,
}

/// Borrowed view of the cache state for serialisation under the write lock.
#[derive(Serialize)]
struct CacheFileRef<'a> {
    result: &'a HashMap<String, Vec<Match>>,
    last_update: DateTime<Utc>,
}

#[derive(Debug)]
struct CacheState {
    result: HashMap<String, Vec<Match>>,
    last_update: DateTime<Utc>,
    last_save: Instant,
    dirty: bool,
}

/// Concurrent match cache with periodic JSON persistence.
///
/// Readers proceed in parallel; writers (including saves, which serialise a
/// consistent snapshot) exclude everyone else. Load and save failures are
/// reported but never fatal: the scan proceeds with the in-memory state.
#[derive(Debug)]
pub struct ResultCache {
    path: PathBuf,
    state: RwLock<CacheState>,
}

impl ResultCache {
    /// Creates a cache backed by `path`, loading any existing content.
    ///
    /// A missing file starts an empty cache; an unreadable or unparsable
    /// file is logged and likewise starts empty.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        let cache = Self {
            path: path.to_path_buf(),
            state: RwLock::new(CacheState {
                result: HashMap::new(),
                last_update: Utc::now(),
                last_save: Instant::now(),
                dirty: false,
            }),
        };

        if let Err(_err) = cache.load() {
            #[cfg(feature = "tracing")]
            warn!(error = %_err, "cache load failed, starting empty");
        }

        cache
    }

    fn load(&self) -> Result<(), CacheError> {
        if !self.path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| CacheError::Load {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let file: CacheFile = serde_json::from_str(&content).map_err(|e| CacheError::Load {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let mut state = self.write_state();
        state.result = file.result;
        state.last_update = file.last_update;

        #[cfg(feature = "tracing")]
        info!(
            path = %self.path.display(),
            entries = state.result.len(),
            last_update = %state.last_update,
            "cache loaded"
        );

        Ok(())
    }

    /// Returns the cached matches for `file`, if the path has been scanned.
    #[must_use]
    pub fn get(&self, file: &str) -> Option<Vec<Match>> {
        self.read_state().result.get(file).cloned()
    }

    /// Records the matches for `file` and marks the cache dirty.
    pub fn set(&self, file: String, matches: Vec<Match>) {
        let mut state = self.write_state();
        state.result.insert(file, matches);
        state.dirty = true;
    }

    /// Returns `true` if the cache is dirty and the save interval has
    /// elapsed since the last save.
    #[must_use]
    pub fn should_save(&self) -> bool {
        let state = self.read_state();
        state.dirty && state.last_save.elapsed() >= SAVE_INTERVAL
    }

    /// Saves if [`Self::should_save`] holds; otherwise a no-op.
    pub fn auto_save(&self) -> Result<(), CacheError> {
        if self.should_save() { self.save() } else { Ok(()) }
    }

    /// Saves unconditionally, refreshing `last_update` and clearing the
    /// dirty flag.
    pub fn force_save(&self) -> Result<(), CacheError> {
        self.save()
    }

    /// Returns the entry count and last update timestamp.
    #[must_use]
    pub fn stats(&self) -> (usize, DateTime<Utc>) {
        let state = self.read_state();
        (state.result.len(), state.last_update)
    }

    fn save(&self) -> Result<(), CacheError> {
        let mut state = self.write_state();
        state.last_save = Instant::now();
        state.last_update = Utc::now();

        let snapshot = CacheFileRef {
            result: &state.result,
            last_update: state.last_update,
        };
        let json = serde_json::to_string(&snapshot).map_err(|e| CacheError::Save {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;

        atomic_write(&self.path, &json).map_err(|source| CacheError::Save {
            path: self.path.clone(),
            source,
        })?;
        state.dirty = false;

        Ok(())
    }

    #[expect(clippy::expect_used, reason = "cache operations never panic while holding the lock")]
    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.state.read().expect("cache lock poisoned")
    }

    #[expect(clippy::expect_used, reason = "cache operations never panic while holding the lock")]
    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, CacheState> {
        self.state.write().expect("cache lock poisoned")
    }
}
