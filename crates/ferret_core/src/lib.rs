//! Core scan engine for ferret.
//!
//! This crate turns a [`ferret_rules::RuleSet`] into compiled matchers and
//! runs them over file trees. It is designed to be embedded: the CLI is one
//! consumer, CI tooling another.
//!
//! # Main Types
//!
//! - [`Scanner`] - parallel scheduler with a per-path result cache
//! - [`RuleEngine`] - applies compiled rules to text buffers
//! - [`Matcher`] - one compiled pattern, bound to one of two regex engines
//! - [`ChunkedReader`] - streams large files as line-aligned chunks
//! - [`Match`] - a detected occurrence with absolute position and context
//!
//! # Error Handling
//!
//! This crate uses [`thiserror`] for structured, typed errors that library
//! consumers can match on: [`RuleError`] (compilation), [`MatchError`]
//! (evaluation), [`CacheError`] and [`ScanError`] (per-file degradation).
//! The CLI crate (`ferret_cli`) uses `anyhow` for error propagation.
//!
//! # Logging
//!
//! Diagnostics go through `tracing` behind the optional `tracing` feature,
//! so embedders that do not install a subscriber pay nothing.

/// On-disk result cache supporting incremental rescans.
pub mod cache;
/// Chunked file reading with line-aligned windows.
pub mod chunk;
/// Encoding detection and lossy decoding.
pub mod encoding;
/// Rule compilation and application to text buffers.
pub mod engine;
/// Error types for compilation, matching, caching, and per-file scanning.
pub mod error;
/// The match record produced by scans.
pub mod finding;
pub(crate) mod fs_util;
/// The two-engine regex adapter.
pub mod matcher;
/// Common re-exports for embedders.
pub mod prelude;
/// Rule self-test harness and report generation.
pub mod ruletest;
/// The parallel scan scheduler.
pub mod scanner;
#[cfg(test)]
pub(crate) mod test_utils;
/// Byte-offset helpers for context windows and line arithmetic.
pub mod text;

pub use cache::ResultCache;
pub use chunk::{ChunkFrame, ChunkedReader};
pub use encoding::FileInfo;
pub use engine::RuleEngine;
pub use error::{CacheError, FerretError, MatchError, RuleError, ScanError};
pub use finding::Match;
pub use matcher::{EngineKind, Matcher};
pub use ruletest::{RuleTestSummary, run_rule_test};
pub use scanner::{ScanConfig, ScanJob, Scanner};
