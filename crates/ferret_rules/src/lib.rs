//! Rule definitions for the ferret scanner.
//!
//! This crate is pure data: the [`Rule`]/[`RuleGroup`]/[`RuleSet`] model,
//! YAML loading, filtering, and the embedded default rule set. Regex
//! compilation lives in `ferret_core` so that this crate stays free of any
//! engine dependency.

mod loader;
mod rule;

pub use loader::{RuleFileError, default_rules, load_rules, write_default_rules};
pub use rule::{EngineChoice, FilterOptions, ParseEngineError, Rule, RuleGroup, RuleSet};

/// Default filename for a ferret rules file.
pub const RULES_FILENAME: &str = "ferret-rules.yaml";
