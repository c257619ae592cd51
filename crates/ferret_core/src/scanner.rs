//! Parallel scan scheduler.
//!
//! One producer feeds file paths into a bounded job channel, a fixed pool
//! of workers runs the per-file protocol, and the calling thread collects
//! exactly one [`ScanJob`] per input path from a bounded result channel.
//! Back-pressure from the bounded queues caps memory regardless of how many
//! paths are queued; worker threads end when the job channel closes.

use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::bounded;
use ferret_rules::RuleSet;

#[cfg(feature = "tracing")]
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::chunk::ChunkedReader;
use crate::encoding::{self, FileInfo};
use crate::engine::RuleEngine;
use crate::error::{RuleError, ScanError};
use crate::finding::Match;

/// Depth of the path queue feeding workers.
const JOB_QUEUE_DEPTH: usize = 100;

/// Depth of the completed-job queue feeding the collector.
const RESULT_QUEUE_DEPTH: usize = 100;

/// Window size for chunked reads of large files.
const CHUNK_SIZE: usize = 1024 * 1024;

const MIB: u64 = 1024 * 1024;

/// Scanner configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Number of parallel scan workers (at least 1).
    pub workers: usize,
    /// Files strictly larger than this many MiB take the chunked read
    /// path; 0 disables chunking and forces whole-file reads.
    pub chunk_limit_mb: u64,
    /// Whether the cache is opportunistically persisted while the scan
    /// runs. The final state is always flushed at shutdown.
    pub save_cache: bool,
    /// Path of the cache file.
    pub cache_path: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            chunk_limit_mb: 5,
            save_cache: false,
            cache_path: PathBuf::from("ferret.cache"),
        }
    }
}

/// Outcome of scanning one file: the path, its matches, and the per-file
/// error if the file could not be scanned.
#[derive(Debug)]
pub struct ScanJob {
    /// The scanned path.
    pub file: PathBuf,
    /// Matches found in the file (empty on error).
    pub matches: Vec<Match>,
    /// Why the file could not be scanned, if it could not.
    pub error: Option<ScanError>,
}

impl ScanJob {
    fn failed(path: &Path, error: ScanError) -> Self {
        Self {
            file: path.to_path_buf(),
            matches: Vec::new(),
            error: Some(error),
        }
    }
}

/// Runs a compiled rule set over file lists with a bounded worker pool and
/// a per-path result cache.
#[derive(Debug)]
pub struct Scanner {
    engine: RuleEngine,
    cache: ResultCache,
    workers: usize,
    chunk_limit_mb: u64,
    save_cache: bool,
}

impl Scanner {
    /// Compiles `rules` and loads the cache. Fails only on rule
    /// compilation; a missing or broken cache file starts empty.
    pub fn new(rules: &RuleSet, config: &ScanConfig) -> Result<Self, RuleError> {
        let engine = RuleEngine::new(rules)?;

        Ok(Self {
            engine,
            cache: ResultCache::new(&config.cache_path),
            workers: config.workers.max(1),
            chunk_limit_mb: config.chunk_limit_mb,
            save_cache: config.save_cache,
        })
    }

    /// Returns the number of compiled matchers.
    #[must_use]
    pub fn matcher_count(&self) -> usize {
        self.engine.matcher_count()
    }

    /// Returns the cache entry count and last update timestamp.
    #[must_use]
    pub fn cache_stats(&self) -> (usize, chrono::DateTime<chrono::Utc>) {
        self.cache.stats()
    }

    /// Scans `files` and returns all matches, in per-job arrival order.
    #[must_use]
    pub fn scan(&self, files: &[PathBuf]) -> Vec<Match> {
        self.scan_with_progress(files, |_| {})
    }

    /// Scans `files`, invoking `observer` once per completed file.
    ///
    /// The observer runs on the calling thread. The returned list is the
    /// concatenation of per-file matches in completion order, which is
    /// non-deterministic across files; within one file the rule engine's
    /// ordering applies.
    #[must_use]
    pub fn scan_with_progress<F: FnMut(&ScanJob)>(&self, files: &[PathBuf], mut observer: F) -> Vec<Match> {
        #[cfg(feature = "tracing")]
        info!(files = files.len(), workers = self.workers, "starting scan");

        let (job_tx, job_rx) = bounded::<PathBuf>(JOB_QUEUE_DEPTH);
        let (result_tx, result_rx) = bounded::<ScanJob>(RESULT_QUEUE_DEPTH);

        let mut all_matches = Vec::new();

        thread::scope(|s| {
            for _ in 0..self.workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || {
                    for path in job_rx.iter() {
                        let job = self.scan_file(&path);
                        if result_tx.send(job).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(result_tx);

            s.spawn(move || {
                for path in files {
                    if job_tx.send(path.clone()).is_err() {
                        break;
                    }
                }
            });

            for _ in 0..files.len() {
                // Disconnection here means every worker died without
                // draining its jobs; stop collecting rather than hang.
                let Ok(job) = result_rx.recv() else {
                    break;
                };

                #[cfg(feature = "tracing")]
                if let Some(error) = &job.error {
                    warn!(file = %job.file.display(), %error, "file skipped");
                }

                observer(&job);
                if job.error.is_none() {
                    all_matches.extend(job.matches);
                }
            }
        });

        // Shutdown flush is unconditional; `save_cache` only gates the
        // opportunistic saves during the scan.
        if let Err(_err) = self.cache.force_save() {
            #[cfg(feature = "tracing")]
            warn!(error = %_err, "cache save failed");
        }

        all_matches
    }

    /// Per-file protocol: cache lookup, then whole-file or chunked scan
    /// depending on size, then cache write-back.
    fn scan_file(&self, path: &Path) -> ScanJob {
        let file_key = path.display().to_string();

        if let Some(matches) = self.cache.get(&file_key) {
            return ScanJob {
                file: path.to_path_buf(),
                matches,
                error: None,
            };
        }

        let info = match FileInfo::probe(path) {
            Ok(info) => info,
            Err(source) => {
                return ScanJob::failed(
                    path,
                    ScanError::Open {
                        path: path.to_path_buf(),
                        source,
                    },
                );
            }
        };

        if info.size == 0 {
            return ScanJob::failed(path, ScanError::ZeroSize { path: path.to_path_buf() });
        }

        let chunked = self.chunk_limit_mb > 0 && info.size > self.chunk_limit_mb * MIB;
        let result = if chunked {
            self.scan_chunked(path, &file_key, info)
        } else {
            self.scan_whole(path, &file_key, info)
        };

        match result {
            Ok(matches) => {
                self.cache.set(file_key, matches.clone());
                if self.save_cache
                    && let Err(_err) = self.cache.auto_save()
                {
                    #[cfg(feature = "tracing")]
                    warn!(error = %_err, "cache auto-save failed");
                }

                ScanJob {
                    file: path.to_path_buf(),
                    matches,
                    error: None,
                }
            }
            Err(error) => ScanJob::failed(path, error),
        }
    }

    fn scan_whole(&self, path: &Path, file_key: &str, info: FileInfo) -> Result<Vec<Match>, ScanError> {
        let content = encoding::read_to_string(path, info.encoding).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(self.engine.apply(&content, file_key, 0, 1))
    }

    fn scan_chunked(&self, path: &Path, file_key: &str, info: FileInfo) -> Result<Vec<Match>, ScanError> {
        let reader = ChunkedReader::open(path, info.encoding, CHUNK_SIZE).map_err(|source| ScanError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut matches = Vec::new();
        for frame in reader {
            let frame = frame.map_err(|source| ScanError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            matches.extend(
                self.engine
                    .apply(&frame.content, file_key, frame.start_offset, frame.start_line),
            );
        }

        Ok(matches)
    }
}
