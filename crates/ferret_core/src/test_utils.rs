//! Test constructors shared by `ferret_core` unit tests.

use ferret_rules::{EngineChoice, Rule, RuleGroup, RuleSet};

use crate::finding::Match;

pub fn make_rule(name: &str, pattern: &str) -> Rule {
    Rule {
        name: name.to_string(),
        pattern: pattern.to_string(),
        engine: EngineChoice::Auto,
        sensitive: false,
        loaded: true,
        context_left: 0,
        context_right: 0,
        sample_code: String::new(),
    }
}

pub fn make_sensitive_rule(name: &str, pattern: &str, context_left: usize, context_right: usize) -> Rule {
    Rule {
        sensitive: true,
        context_left,
        context_right,
        ..make_rule(name, pattern)
    }
}

pub fn make_rule_set(groups: Vec<(&str, Vec<Rule>)>) -> RuleSet {
    RuleSet {
        groups: groups
            .into_iter()
            .map(|(name, rules)| RuleGroup {
                name: name.to_string(),
                rules,
            })
            .collect(),
    }
}

pub fn make_match(file: &str, group: &str, rule: &str, matched: &str, position: u64, line: u32) -> Match {
    Match {
        file: file.to_string(),
        group: group.to_string(),
        rule_name: rule.to_string(),
        matched: matched.to_string(),
        context: matched.to_string(),
        position,
        line_number: line,
        sensitive: false,
    }
}
