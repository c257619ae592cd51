//! Rule self-test harness.
//!
//! Compiles every loaded rule and checks it against its own `sample_code`,
//! then writes a markdown report next to the rules file. The report is the
//! product: findings never fail the process.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use ferret_rules::RuleSet;

#[cfg(feature = "tracing")]
use tracing::info;

use crate::engine::compile_rule;

/// Outcome counts of a rule test run.
#[derive(Debug, Default)]
pub struct RuleTestSummary {
    /// Rules whose pattern compiled and matched their sample.
    pub valid: Vec<String>,
    /// Rules with no `sample_code` to check against.
    pub no_sample: Vec<String>,
    /// Rules that failed to compile or did not match their sample.
    pub compile_errors: Vec<String>,
}

impl RuleTestSummary {
    /// Total number of rules tested.
    #[must_use]
    pub fn total(&self) -> usize {
        self.valid.len() + self.no_sample.len() + self.compile_errors.len()
    }
}

/// Tests every loaded rule of `rules` and writes `<stem>_test.md` next to
/// `rules_file`. Returns the report path and the summary.
pub fn run_rule_test(rules_file: &Path, rules: &RuleSet) -> io::Result<(PathBuf, RuleTestSummary)> {
    let summary = test_rules(rules);
    let report_path = report_path_for(rules_file);

    std::fs::write(&report_path, render_report(rules_file, &summary))?;

    #[cfg(feature = "tracing")]
    info!(
        total = summary.total(),
        valid = summary.valid.len(),
        no_sample = summary.no_sample.len(),
        compile_errors = summary.compile_errors.len(),
        report = %report_path.display(),
        "rule test completed"
    );

    Ok((report_path, summary))
}

/// Classifies every loaded rule without touching the filesystem.
#[must_use]
pub fn test_rules(rules: &RuleSet) -> RuleTestSummary {
    let mut summary = RuleTestSummary::default();

    for group in &rules.groups {
        for rule in group.rules.iter().filter(|r| r.loaded) {
            let label = format!("{}: {}", group.name, rule.name);

            let matcher = match compile_rule(&group.name, rule) {
                Ok(matcher) => matcher,
                Err(err) => {
                    summary.compile_errors.push(format!("{label} - {err}"));
                    continue;
                }
            };

            if rule.sample_code.is_empty() {
                summary.no_sample.push(label);
                continue;
            }

            match matcher.is_match(&rule.sample_code) {
                Ok(true) => summary.valid.push(label),
                Ok(false) => summary
                    .compile_errors
                    .push(format!("{label} - pattern does not match its sample")),
                Err(err) => summary.compile_errors.push(format!("{label} - {err}")),
            }
        }
    }

    summary
}

fn report_path_for(rules_file: &Path) -> PathBuf {
    let stem = rules_file
        .file_stem()
        .map_or_else(|| "rules".to_string(), |s| s.to_string_lossy().into_owned());
    rules_file.with_file_name(format!("{stem}_test.md"))
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        #[expect(clippy::cast_precision_loss, reason = "rule counts are far below 2^52")]
        {
            part as f64 / total as f64 * 100.0
        }
    }
}

fn render_report(rules_file: &Path, summary: &RuleTestSummary) -> String {
    let total = summary.total();
    let mut out = String::new();

    let _ = writeln!(out, "# Rule test report\n");
    let _ = writeln!(out, "- **Rules file**: {}", rules_file.display());
    let _ = writeln!(out, "- **Tested at**: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "- **Rules tested**: {total}\n");

    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "| Status | Count | Share |");
    let _ = writeln!(out, "|--------|-------|-------|");
    let _ = writeln!(
        out,
        "| valid | {} | {:.2}% |",
        summary.valid.len(),
        percentage(summary.valid.len(), total)
    );
    let _ = writeln!(
        out,
        "| no sample | {} | {:.2}% |",
        summary.no_sample.len(),
        percentage(summary.no_sample.len(), total)
    );
    let _ = writeln!(
        out,
        "| compile error | {} | {:.2}% |\n",
        summary.compile_errors.len(),
        percentage(summary.compile_errors.len(), total)
    );

    let _ = writeln!(out, "## Compile errors\n");
    if summary.compile_errors.is_empty() {
        let _ = writeln!(out, "No rule failed to compile or missed its sample.\n");
    } else {
        for entry in &summary.compile_errors {
            let _ = writeln!(out, "- {entry}");
        }
        let _ = writeln!(
            out,
            "\nCheck the pattern syntax against the selected engine and make sure the sample really matches.\n"
        );
    }

    let _ = writeln!(out, "## Rules without samples\n");
    if summary.no_sample.is_empty() {
        let _ = writeln!(out, "Every rule carries a sample.\n");
    } else {
        for entry in &summary.no_sample {
            let _ = writeln!(out, "- {entry}");
        }
        let _ = writeln!(
            out,
            "\nAdd a `sample_code` to each of these so the pattern stays covered by this report.\n"
        );
    }

    let _ = writeln!(out, "## Valid rules\n");
    if summary.valid.is_empty() {
        let _ = writeln!(out, "No rule passed with a matching sample.");
    } else {
        for entry in &summary.valid {
            let _ = writeln!(out, "- {entry}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::{make_rule, make_rule_set};

    fn rule_with_sample(name: &str, pattern: &str, sample: &str) -> ferret_rules::Rule {
        let mut rule = make_rule(name, pattern);
        rule.sample_code = sample.to_string();
        rule
    }

    #[test]
    fn classifies_valid_no_sample_and_broken_rules() {
        let rules = make_rule_set(vec![(
            "g",
            vec![
                rule_with_sample("good", r"TOKEN_\d+", "see TOKEN_12345"),
                make_rule("bare", r"\bsomething\b"),
                rule_with_sample("broken", r"([unclosed", "whatever"),
                rule_with_sample("mismatched", r"TOKEN_\d+", "no token here"),
            ],
        )]);

        let summary = test_rules(&rules);

        assert_eq!(summary.valid, vec!["g: good"]);
        assert_eq!(summary.no_sample, vec!["g: bare"]);
        assert_eq!(summary.compile_errors.len(), 2);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn unloaded_rules_are_not_tested() {
        let mut rule = rule_with_sample("off", r"TOKEN_\d+", "TOKEN_12345");
        rule.loaded = false;
        let summary = test_rules(&make_rule_set(vec![("g", vec![rule])]));

        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn samples_match_case_insensitively_like_the_engine() {
        let rules = make_rule_set(vec![("g", vec![rule_with_sample("ci", r"token_\d+", "TOKEN_12345")])]);

        let summary = test_rules(&rules);

        assert_eq!(summary.valid.len(), 1);
    }

    #[test]
    fn report_is_written_next_to_rules_file() {
        let dir = TempDir::new().unwrap();
        let rules_file = dir.path().join("myrules.yaml");
        let rules = make_rule_set(vec![("g", vec![rule_with_sample("good", r"TOKEN_\d+", "TOKEN_12345")])]);

        let (report_path, summary) = run_rule_test(&rules_file, &rules).unwrap();

        assert_eq!(report_path, dir.path().join("myrules_test.md"));
        assert_eq!(summary.valid.len(), 1);

        let report = std::fs::read_to_string(&report_path).unwrap();
        assert!(report.contains("# Rule test report"));
        assert!(report.contains("| valid | 1 | 100.00% |"));
        assert!(report.contains("g: good"));
    }

    #[test]
    fn report_handles_empty_rule_set() {
        let dir = TempDir::new().unwrap();
        let rules_file = dir.path().join("empty.yaml");

        let (report_path, summary) = run_rule_test(&rules_file, &RuleSet::default()).unwrap();

        assert_eq!(summary.total(), 0);
        let report = std::fs::read_to_string(&report_path).unwrap();
        assert!(report.contains("| valid | 0 | 0.00% |"));
    }

    #[test]
    fn built_in_rules_all_pass_their_samples() {
        let summary = test_rules(&ferret_rules::default_rules());

        assert!(
            summary.compile_errors.is_empty(),
            "built-in rules failed: {:?}",
            summary.compile_errors
        );
        assert_eq!(summary.no_sample.len(), 1);
    }
}
