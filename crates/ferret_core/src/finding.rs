//! The match record produced by the scan engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete occurrence of a rule's pattern in a file.
///
/// `position` is the absolute byte offset of the match in the file and
/// `line_number` is 1-based, both computed from the buffer the match was
/// found in plus that buffer's base offsets, so chunked and whole-file scans
/// report identical locations. Serialised field names are the on-disk cache
/// and JSON output contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Path of the file the match was found in.
    pub file: String,

    /// Name of the rule group the matching rule belongs to.
    pub group: String,

    /// Name of the matching rule.
    pub rule_name: String,

    /// The matched text itself.
    #[serde(rename = "match")]
    pub matched: String,

    /// Content surrounding the match, clipped to the buffer. Always
    /// contains `matched` as a substring.
    pub context: String,

    /// Absolute byte offset of the match in the source file.
    pub position: u64,

    /// 1-based line number of the match.
    pub line_number: u32,

    /// Whether the matching rule is flagged sensitive.
    pub sensitive: bool,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}/{}] {}",
            self.file, self.line_number, self.group, self.rule_name, self.matched
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_match;

    #[test]
    fn serialises_with_contract_field_names() {
        let m = make_match("config.py", "credentials", "api key", "SECRET_ABCDEF", 42, 3);
        let json = serde_json::to_value(&m).unwrap();

        assert_eq!(json["file"], "config.py");
        assert_eq!(json["match"], "SECRET_ABCDEF");
        assert_eq!(json["rule_name"], "api key");
        assert_eq!(json["position"], 42);
        assert_eq!(json["line_number"], 3);
        assert_eq!(json["sensitive"], false);
    }

    #[test]
    fn json_round_trip_preserves_all_fields() {
        let m = make_match("a.txt", "g", "r", "matched-text", 1000, 17);
        let json = serde_json::to_string(&m).unwrap();
        let back: Match = serde_json::from_str(&json).unwrap();

        assert_eq!(back, m);
    }

    #[test]
    fn display_shows_location_rule_and_text() {
        let m = make_match("src/db.rs", "credentials", "password", "password = \"x\"", 0, 12);
        let display = format!("{m}");

        assert!(display.contains("src/db.rs:12"));
        assert!(display.contains("credentials/password"));
    }
}
