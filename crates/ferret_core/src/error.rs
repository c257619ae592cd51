use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::matcher::EngineKind;

/// Errors raised while compiling a rule set into matchers.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule's pattern failed to compile under its selected engine(s).
    #[error("invalid pattern in rule [{group}:{rule}] ({engine} engine): {message}")]
    InvalidPattern {
        /// Group the failing rule belongs to.
        group: String,
        /// Name of the failing rule.
        rule: String,
        /// Engine (or last engine attempted) that rejected the pattern.
        engine: EngineKind,
        /// The engine's own description of the failure.
        message: String,
    },
}

/// Errors raised while evaluating a compiled matcher against text.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The backtracking engine exhausted its execution budget. Matching
    /// this rule against the current buffer is abandoned.
    #[error("match exceeded the backtracking budget")]
    Timeout,

    /// The engine reported a runtime failure other than budget exhaustion.
    #[error("regex evaluation failed: {0}")]
    Engine(String),
}

/// Errors raised by the result cache. Both variants are reported and
/// swallowed by the scanner: a broken cache degrades to a cold one.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file exists but could not be read or parsed.
    #[error("failed to load cache {path}: {message}")]
    Load {
        /// Path of the cache file.
        path: PathBuf,
        /// Read or parse failure description.
        message: String,
    },

    /// The cache file could not be written.
    #[error("failed to save cache {path}: {source}")]
    Save {
        /// Path of the cache file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Per-file failures surfaced on a scan job instead of aborting the scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The file could not be opened or stat'ed.
    #[error("failed to access {path}: {source}")]
    Open {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file has no content to scan.
    #[error("{path} is empty")]
    ZeroSize {
        /// Path of the file.
        path: PathBuf,
    },
}

/// Top-level error type for embedders that drive the full pipeline.
#[derive(Debug, Error)]
pub enum FerretError {
    /// A rule failed to compile.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// A rules file could not be loaded.
    #[error(transparent)]
    RuleFile(#[from] ferret_rules::RuleFileError),

    /// An I/O failure outside the per-file scan protocol.
    #[error(transparent)]
    Io(#[from] io::Error),
}
