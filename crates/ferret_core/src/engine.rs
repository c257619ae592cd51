//! Rule engine: compiles a rule set and applies it to text buffers.

use ferret_rules::{Rule, RuleSet};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::error::{MatchError, RuleError};
use crate::finding::Match;
use crate::matcher::Matcher;
use crate::text::{context_window, newlines_before, snap_right};

/// Matches whose trimmed text is this many bytes or fewer are noise and
/// dropped.
const MIN_MATCH_LEN: usize = 5;

/// Context width substituted on each side for sensitive rules that do not
/// configure their own.
const SENSITIVE_CONTEXT: usize = 50;

/// A rule compiled and ready to run, identified by its position within its
/// group.
#[derive(Debug)]
struct CompiledRule {
    name: String,
    sensitive: bool,
    context_left: usize,
    context_right: usize,
    matcher: Matcher,
}

impl CompiledRule {
    /// Effective context widths: the rule's own, or 50/50 for sensitive
    /// rules that configure neither side.
    const fn context_widths(&self) -> (usize, usize) {
        if self.sensitive && self.context_left == 0 && self.context_right == 0 {
            (SENSITIVE_CONTEXT, SENSITIVE_CONTEXT)
        } else {
            (self.context_left, self.context_right)
        }
    }
}

#[derive(Debug)]
struct CompiledGroup {
    name: String,
    rules: Vec<CompiledRule>,
}

/// Applies every compiled rule of a rule set to text buffers, producing
/// [`Match`] records with absolute positions.
///
/// Construction compiles each loaded rule under its declared engine (or the
/// fallback policy) with `(?im)` prepended, and fails on the first pattern
/// no engine accepts. Compiled matchers are immutable afterwards, so one
/// engine serves any number of scan workers.
#[derive(Debug)]
pub struct RuleEngine {
    groups: Vec<CompiledGroup>,
}

impl RuleEngine {
    /// Compiles all loaded rules of `rules`, in declared order.
    pub fn new(rules: &RuleSet) -> Result<Self, RuleError> {
        let mut groups = Vec::with_capacity(rules.group_count());

        for group in &rules.groups {
            let mut compiled = Vec::new();

            for rule in group.rules.iter().filter(|r| r.loaded) {
                let matcher = compile_rule(&group.name, rule)?;
                compiled.push(CompiledRule {
                    name: rule.name.clone(),
                    sensitive: rule.sensitive,
                    context_left: rule.context_left,
                    context_right: rule.context_right,
                    matcher,
                });
            }

            groups.push(CompiledGroup {
                name: group.name.clone(),
                rules: compiled,
            });
        }

        #[cfg(feature = "tracing")]
        debug!(
            patterns = groups.iter().map(|g| g.rules.len()).sum::<usize>(),
            "compiled rule set"
        );

        Ok(Self { groups })
    }

    /// Compiles every loaded rule and collects *all* failures instead of
    /// stopping at the first, for pre-flight diagnostics. An empty vector
    /// means the whole set compiles.
    #[must_use]
    pub fn validate(rules: &RuleSet) -> Vec<String> {
        let mut problems = Vec::new();

        for group in &rules.groups {
            for rule in group.rules.iter().filter(|r| r.loaded) {
                if let Err(err) = compile_rule(&group.name, rule) {
                    problems.push(err.to_string());
                }
            }
        }

        problems
    }

    /// Returns the number of compiled matchers.
    #[must_use]
    pub fn matcher_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }

    /// Runs every rule over `content` and returns the matches.
    ///
    /// `base_offset` is the absolute byte offset of `content` within the
    /// source file and `base_line` its 1-based starting line; both default
    /// to `(0, 1)` for whole-file buffers. Results are grouped by
    /// `(group, rule)` in declared order and by ascending position within a
    /// rule; no cross-rule ordering is promised.
    #[must_use]
    pub fn apply(&self, content: &str, file: &str, base_offset: u64, base_line: u32) -> Vec<Match> {
        let mut matches = Vec::new();

        for group in &self.groups {
            for rule in &group.rules {
                apply_rule(rule, &group.name, content, file, base_offset, base_line, &mut matches);
            }
        }

        matches
    }
}

pub(crate) fn compile_rule(group: &str, rule: &Rule) -> Result<Matcher, RuleError> {
    // Rule patterns match case-insensitively and treat ^/$ as line anchors.
    let pattern = format!("(?im){}", rule.pattern);

    Matcher::compile(&pattern, rule.engine).map_err(|e| RuleError::InvalidPattern {
        group: group.to_string(),
        rule: rule.name.clone(),
        engine: e.engine,
        message: e.message,
    })
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "newline counts within a single buffer fit in u32"
)]
fn apply_rule(
    rule: &CompiledRule,
    group: &str,
    content: &str,
    file: &str,
    base_offset: u64,
    base_line: u32,
    matches: &mut Vec<Match>,
) {
    let (left, right) = rule.context_widths();
    let mut pos = 0;

    loop {
        let span = match rule.matcher.find_at(content, pos) {
            Ok(Some(span)) => span,
            Ok(None) => break,
            Err(MatchError::Timeout) => {
                // Keep what this rule already produced on this buffer and
                // move on to the next rule.
                #[cfg(feature = "tracing")]
                warn!(group, rule = %rule.name, file, "match timed out, rule skipped for this buffer");
                break;
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                warn!(group, rule = %rule.name, file, error = %_err, "match failed, rule skipped for this buffer");
                break;
            }
        };

        let matched = &content[span.start..span.end];
        if matched.trim().len() > MIN_MATCH_LEN {
            matches.push(Match {
                file: file.to_string(),
                group: group.to_string(),
                rule_name: rule.name.clone(),
                matched: matched.to_string(),
                context: context_window(content, span.start, span.end, left, right).to_string(),
                position: base_offset + span.start as u64,
                line_number: base_line + newlines_before(content, span.start) as u32,
                sensitive: rule.sensitive,
            });
        }

        let next = if span.end > span.start { span.end } else { span.end + 1 };
        if next > content.len() {
            break;
        }
        pos = snap_right(content, next);
    }
}
