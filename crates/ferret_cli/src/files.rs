//! File collection for scanning.
//!
//! Walks the target paths and applies the exclusion model: a built-in list
//! of binary/media extensions, user-supplied extra extensions, path
//! keywords, and a size cap. Version-control ignore files are not
//! consulted - what gets scanned is controlled by these filters alone.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Extensions excluded from scanning by default (binaries, archives,
/// media, fonts, office documents).
const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    ".tmp", ".exe", ".bin", ".dll", ".elf", ".so", ".dylib", ".zip", ".rar", ".7z", ".gz", ".bz2", ".tar", ".xz",
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".woff", ".woff2", ".ttf", ".otf", ".eot", ".mp3",
    ".mp4", ".avi", ".mov", ".wmv", ".flv", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
];

const MIB: u64 = 1024 * 1024;

/// Filters applied while collecting files.
#[derive(Debug, Clone, Default)]
pub struct CollectOptions {
    /// Extra extensions to exclude, with or without a leading dot.
    pub exclude_ext: Vec<String>,
    /// Path keywords: any path containing one is skipped.
    pub exclude_path: Vec<String>,
    /// Files larger than this many MiB are skipped; 0 means no cap.
    pub limit_size_mb: u64,
}

struct Filters {
    extensions: Vec<String>,
    path_keywords: Vec<String>,
    limit_size: u64,
}

impl Filters {
    fn new(opts: &CollectOptions) -> Self {
        let mut extensions: Vec<String> = DEFAULT_EXCLUDED_EXTENSIONS.iter().map(|e| (*e).to_string()).collect();
        for ext in &opts.exclude_ext {
            let ext = ext.trim().to_lowercase();
            if ext.is_empty() {
                continue;
            }
            if ext.starts_with('.') {
                extensions.push(ext);
            } else {
                extensions.push(format!(".{ext}"));
            }
        }

        Self {
            extensions,
            path_keywords: opts.exclude_path.clone(),
            limit_size: opts.limit_size_mb * MIB,
        }
    }

    fn excludes(&self, path: &Path, size: u64) -> bool {
        if self.limit_size > 0 && size > self.limit_size {
            return true;
        }

        if let Some(ext) = path.extension() {
            let dotted = format!(".{}", ext.to_string_lossy().to_lowercase());
            if self.extensions.contains(&dotted) {
                return true;
            }
        }

        let display = path.display().to_string();
        self.path_keywords.iter().any(|kw| !kw.is_empty() && display.contains(kw))
    }
}

/// Walks `paths` and returns every scannable file, filtered per `opts`.
#[must_use]
pub fn collect_files(paths: &[PathBuf], opts: &CollectOptions) -> Vec<PathBuf> {
    let filters = Filters::new(opts);
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            if !filters.excludes(path, size) {
                files.push(path.clone());
            }
            continue;
        }

        let walker = WalkBuilder::new(path)
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .build_parallel();

        let (tx, rx) = std::sync::mpsc::channel();
        walker.run(|| {
            let tx = tx.clone();
            let filters = &filters;
            Box::new(move |result| {
                if let Ok(entry) = result
                    && entry.file_type().is_some_and(|ft| ft.is_file())
                {
                    let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                    if !filters.excludes(entry.path(), size) {
                        let _ = tx.send(entry.into_path());
                    }
                }
                ignore::WalkState::Continue
            })
        });
        drop(tx);
        files.extend(rx);
    }

    files.sort();
    files
}
