//! Rule model types shared by the scanner and the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an unrecognised engine string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEngineError {
    invalid_value: Box<str>,
}

impl ParseEngineError {
    fn new(value: &str) -> Self {
        Self {
            invalid_value: value.into(),
        }
    }

    /// Returns the invalid value that caused the parse failure.
    #[must_use]
    pub fn invalid_value(&self) -> &str {
        &self.invalid_value
    }
}

impl fmt::Display for ParseEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid engine '{}': expected 're2', 'pcre', or empty for automatic selection",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParseEngineError {}

/// Which regex engine a rule's pattern should be compiled with.
///
/// `Auto` (the default) tries the linear engine first and falls back to the
/// backtracking engine when the pattern uses constructs the linear engine
/// rejects (lookaround, backreferences).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EngineChoice {
    /// Try linear first, fall back to backtracking.
    #[default]
    Auto,
    /// Linear RE2-style engine only.
    Linear,
    /// Backtracking PCRE-style engine only.
    Backtracking,
}

impl EngineChoice {
    /// Canonical string form used in rule files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "",
            Self::Linear => "re2",
            Self::Backtracking => "pcre",
        }
    }
}

impl fmt::Display for EngineChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Linear => write!(f, "re2"),
            Self::Backtracking => write!(f, "pcre"),
        }
    }
}

impl FromStr for EngineChoice {
    type Err = ParseEngineError;

    /// Parses an engine name. Legacy rule files used `go` for the linear
    /// engine and `dfa`/`nfa`/`java` for the backtracking one; those aliases
    /// remain accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "re2" | "go" => Ok(Self::Linear),
            "pcre" | "dfa" | "nfa" | "java" => Ok(Self::Backtracking),
            _ => Err(ParseEngineError::new(s)),
        }
    }
}

impl Serialize for EngineChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EngineChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single detection rule: a named regex plus metadata controlling
/// sensitivity, context widths, and engine selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name shown in results (e.g. `"github personal access token"`).
    pub name: String,

    /// Regular expression source. Compiled with `(?im)` prepended.
    #[serde(alias = "f_regex")]
    pub pattern: String,

    /// Engine selection. Empty/absent means automatic with fallback.
    #[serde(default)]
    pub engine: EngineChoice,

    /// Whether matches of this rule are sensitive data. Sensitive rules with
    /// no configured context widths get a 50-byte window on each side.
    #[serde(default)]
    pub sensitive: bool,

    /// Whether the rule participates in scanning. Disabled rules are
    /// omitted from compilation, filtering, and the self-test report.
    #[serde(default = "default_loaded")]
    pub loaded: bool,

    /// Bytes of context captured to the left of a match.
    #[serde(default)]
    pub context_left: usize,

    /// Bytes of context captured to the right of a match.
    #[serde(default)]
    pub context_right: usize,

    /// Example text the pattern is expected to match, exercised by the
    /// rule self-test harness.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sample_code: String,
}

const fn default_loaded() -> bool {
    true
}

/// A named, ordered collection of rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleGroup {
    /// Group name shown in results (e.g. `"credentials"`).
    #[serde(rename = "group")]
    pub name: String,

    /// Rules in declared order. The pair (group name, index in this list)
    /// identifies a compiled matcher for the lifetime of a scan.
    #[serde(rename = "rules", alias = "rule")]
    pub rules: Vec<Rule>,
}

/// Filter criteria applied to a rule set before scanning.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Case-insensitive substrings matched against group names.
    pub groups: Vec<String>,
    /// Case-insensitive substrings matched against rule names.
    pub names: Vec<String>,
    /// Keep only rules flagged `sensitive`.
    pub sensitive_only: bool,
}

/// An ordered list of rule groups, as loaded from a rules file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule groups in declared order.
    #[serde(rename = "rules")]
    pub groups: Vec<RuleGroup>,
}

impl RuleSet {
    /// Returns the number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns the total number of loaded rules across all groups.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.rules.iter().filter(|r| r.loaded).count())
            .sum()
    }

    /// Returns `true` if no group contains a loaded rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }

    /// Structural problems in the rule set: loaded rules missing a name or
    /// a pattern. An empty vector means the set is well-formed. Regex
    /// compilation is checked separately by the scan engine.
    #[must_use]
    pub fn shape_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for group in &self.groups {
            for (idx, rule) in group.rules.iter().enumerate() {
                if !rule.loaded {
                    continue;
                }
                if rule.name.trim().is_empty() {
                    problems.push(format!("group '{}': rule #{} has no name", group.name, idx + 1));
                } else if rule.pattern.trim().is_empty() {
                    problems.push(format!("group '{}': rule '{}' has no pattern", group.name, rule.name));
                }
            }
        }

        problems
    }

    /// Returns a new set containing only the rules that pass the filter.
    ///
    /// Group and name filters are case-insensitive substring matches, empty
    /// filter lists match everything. Unloaded rules and rules with an
    /// empty name or pattern are always dropped; groups left without rules
    /// disappear from the result.
    #[must_use]
    pub fn filtered(&self, opts: &FilterOptions) -> Self {
        let group_needles = lowercase_needles(&opts.groups);
        let name_needles = lowercase_needles(&opts.names);

        let groups = self
            .groups
            .iter()
            .filter(|group| matches_any(&group.name, &group_needles))
            .filter_map(|group| {
                let rules: Vec<Rule> = group
                    .rules
                    .iter()
                    .filter(|rule| rule.loaded && !rule.name.is_empty() && !rule.pattern.is_empty())
                    .filter(|rule| !opts.sensitive_only || rule.sensitive)
                    .filter(|rule| matches_any(&rule.name, &name_needles))
                    .cloned()
                    .collect();

                (!rules.is_empty()).then(|| RuleGroup {
                    name: group.name.clone(),
                    rules,
                })
            })
            .collect();

        Self { groups }
    }
}

fn lowercase_needles(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn matches_any(value: &str, needles: &[String]) -> bool {
    if needles.is_empty() {
        return true;
    }
    let lower = value.to_lowercase();
    needles.iter().any(|needle| lower.contains(needle.as_str()))
}
