//! Convenience re-exports of the most commonly used types.

pub use crate::cache::ResultCache;
pub use crate::engine::RuleEngine;
pub use crate::error::{CacheError, FerretError, MatchError, RuleError, ScanError};
pub use crate::finding::Match;
pub use crate::matcher::{EngineKind, Matcher};
pub use crate::ruletest::{RuleTestSummary, run_rule_test};
pub use crate::scanner::{ScanConfig, ScanJob, Scanner};
pub use ferret_rules::{EngineChoice, FilterOptions, Rule, RuleGroup, RuleSet};
