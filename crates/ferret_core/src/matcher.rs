//! Uniform matcher over the two regex engines.
//!
//! Patterns compile into one of two runtimes: the linear engine (the
//! `regex` crate - no backreferences or lookaround, worst case linear in
//! input length) or the backtracking engine (`fancy-regex` - lookaround,
//! backreferences, conditionals, worst case exponential). The backtracking
//! engine runs under a bounded backtrack budget so a pathological pattern
//! aborts instead of stalling a worker; budget exhaustion surfaces as
//! [`MatchError::Timeout`].

use std::fmt;

use ferret_rules::EngineChoice;

use crate::error::MatchError;

/// Backtracking steps allowed per `find`/`is_match` call. Stands in for the
/// wall-clock cap a backtracking engine would otherwise need: `fancy-regex`
/// counts steps, not seconds, and a step budget is interruptible where a
/// timer is not.
const BACKTRACK_BUDGET: usize = 1_000_000;

/// Which engine a matcher was compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// RE2-style linear-time engine.
    Linear,
    /// PCRE-style backtracking engine.
    Backtracking,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "re2"),
            Self::Backtracking => write!(f, "pcre"),
        }
    }
}

/// Byte range of a single match within the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
}

/// A pattern compilation failure, tagged with the engine that rejected it.
#[derive(Debug, Clone)]
pub struct CompileError {
    /// Engine (or last engine attempted) that rejected the pattern.
    pub engine: EngineKind,
    /// The engine's own description of the failure.
    pub message: String,
}

/// A compiled pattern bound to one engine.
///
/// Matchers are immutable after compilation and shared freely across scan
/// workers.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Compiled under the linear engine.
    Linear(regex::Regex),
    /// Compiled under the backtracking engine.
    Backtracking(fancy_regex::Regex),
}

impl Matcher {
    /// Compiles `pattern` according to `choice`.
    ///
    /// With [`EngineChoice::Auto`], the linear engine is tried first and the
    /// backtracking engine is the fallback; if both reject the pattern, the
    /// error reports the backtracking engine's diagnostic (the engine with
    /// the larger accepted syntax).
    pub fn compile(pattern: &str, choice: EngineChoice) -> Result<Self, CompileError> {
        match choice {
            EngineChoice::Linear => compile_linear(pattern),
            EngineChoice::Backtracking => compile_backtracking(pattern),
            EngineChoice::Auto => compile_linear(pattern).or_else(|_| compile_backtracking(pattern)),
        }
    }

    /// Returns the engine this matcher was compiled with.
    #[must_use]
    pub const fn kind(&self) -> EngineKind {
        match self {
            Self::Linear(_) => EngineKind::Linear,
            Self::Backtracking(_) => EngineKind::Backtracking,
        }
    }

    /// Returns `true` if the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> Result<bool, MatchError> {
        match self {
            Self::Linear(re) => Ok(re.is_match(text)),
            Self::Backtracking(re) => re.is_match(text).map_err(map_runtime_error),
        }
    }

    /// Finds the leftmost match starting at or after byte offset `start`.
    ///
    /// Both engines report native byte offsets, so callers never need to
    /// re-locate matched text by substring search.
    pub fn find_at(&self, text: &str, start: usize) -> Result<Option<MatchSpan>, MatchError> {
        if start > text.len() {
            return Ok(None);
        }

        match self {
            Self::Linear(re) => Ok(re.find_at(text, start).map(|m| MatchSpan {
                start: m.start(),
                end: m.end(),
            })),
            Self::Backtracking(re) => re
                .find_from_pos(text, start)
                .map(|found| {
                    found.map(|m| MatchSpan {
                        start: m.start(),
                        end: m.end(),
                    })
                })
                .map_err(map_runtime_error),
        }
    }

    /// Collects the text of up to `max` non-overlapping matches; `max == 0`
    /// means unlimited. Evaluation errors end the collection early.
    #[must_use]
    pub fn find_all(&self, text: &str, max: usize) -> Vec<String> {
        let mut out = Vec::new();
        let mut pos = 0;

        while max == 0 || out.len() < max {
            let Ok(Some(span)) = self.find_at(text, pos) else {
                break;
            };
            out.push(text[span.start..span.end].to_string());

            // Step over empty matches so the loop always advances.
            pos = if span.end > span.start { span.end } else { span.end + 1 };
            if pos > text.len() {
                break;
            }
            pos = crate::text::snap_right(text, pos);
        }

        out
    }
}

fn compile_linear(pattern: &str) -> Result<Matcher, CompileError> {
    regex::Regex::new(pattern)
        .map(Matcher::Linear)
        .map_err(|e| CompileError {
            engine: EngineKind::Linear,
            message: e.to_string(),
        })
}

fn compile_backtracking(pattern: &str) -> Result<Matcher, CompileError> {
    fancy_regex::RegexBuilder::new(pattern)
        .backtrack_limit(BACKTRACK_BUDGET)
        .build()
        .map(Matcher::Backtracking)
        .map_err(|e| CompileError {
            engine: EngineKind::Backtracking,
            message: e.to_string(),
        })
}

fn map_runtime_error(error: fancy_regex::Error) -> MatchError {
    match error {
        fancy_regex::Error::RuntimeError(fancy_regex::RuntimeError::BacktrackLimitExceeded) => MatchError::Timeout,
        other => MatchError::Engine(other.to_string()),
    }
}
