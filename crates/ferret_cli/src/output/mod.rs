//! Result output: filtering, field selection, and JSON/CSV serialisation.

mod csv_out;
mod json;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use ferret_core::Match;

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array.
    #[default]
    Json,
    /// CSV with a header row.
    Csv,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Fields of a match record that can be selected for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputKey {
    /// File path.
    File,
    /// Rule group name.
    Group,
    /// Rule name.
    RuleName,
    /// Matched text.
    Match,
    /// Context around the match.
    Context,
    /// Absolute byte offset.
    Position,
    /// 1-based line number.
    LineNumber,
    /// Sensitivity flag.
    Sensitive,
}

impl OutputKey {
    /// All keys, in the order they appear in full output.
    pub const ALL: [Self; 8] = [
        Self::File,
        Self::Group,
        Self::RuleName,
        Self::Match,
        Self::Context,
        Self::Position,
        Self::LineNumber,
        Self::Sensitive,
    ];

    const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Group => "group",
            Self::RuleName => "rule_name",
            Self::Match => "match",
            Self::Context => "context",
            Self::Position => "position",
            Self::LineNumber => "line_number",
            Self::Sensitive => "sensitive",
        }
    }

    fn value_of(self, m: &Match) -> serde_json::Value {
        match self {
            Self::File => m.file.clone().into(),
            Self::Group => m.group.clone().into(),
            Self::RuleName => m.rule_name.clone().into(),
            Self::Match => m.matched.clone().into(),
            Self::Context => m.context.clone().into(),
            Self::Position => m.position.into(),
            Self::LineNumber => m.line_number.into(),
            Self::Sensitive => m.sensitive.into(),
        }
    }

    fn text_of(self, m: &Match) -> String {
        match self {
            Self::File => m.file.clone(),
            Self::Group => m.group.clone(),
            Self::RuleName => m.rule_name.clone(),
            Self::Match => m.matched.clone(),
            Self::Context => m.context.clone(),
            Self::Position => m.position.to_string(),
            Self::LineNumber => m.line_number.to_string(),
            Self::Sensitive => m.sensitive.to_string(),
        }
    }
}

/// How scan results are filtered and written.
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    /// Serialisation format.
    pub format: OutputFormat,
    /// Target file; `None` writes to stdout.
    pub output: Option<PathBuf>,
    /// Selected fields; empty selects all.
    pub keys: Vec<OutputKey>,
    /// Matches containing any of these words are dropped.
    pub block_matches: Vec<String>,
    /// Trim whitespace and surrounding quotes from matched text.
    pub clean: bool,
    /// Write one file per rule group (requires `output`).
    pub group_split: bool,
}

/// Applies blocklist and cleanup filters, then writes the results.
/// Returns the number of matches written.
pub fn process_results(opts: &OutputOptions, mut matches: Vec<Match>) -> anyhow::Result<usize> {
    if !opts.block_matches.is_empty() {
        matches.retain(|m| !opts.block_matches.iter().any(|word| m.matched.contains(word)));
    }

    if opts.clean {
        for m in &mut matches {
            m.matched = clean_text(&m.matched);
            m.context = m.context.trim().to_string();
        }
    }

    let written = matches.len();
    match (&opts.output, opts.group_split) {
        (Some(path), true) => write_grouped(opts, path, matches)?,
        (Some(path), false) => write_to_file(opts, path, &matches)?,
        (None, _) => {
            let stdout = std::io::stdout().lock();
            write_to(opts, stdout, &matches)?;
        }
    }

    Ok(written)
}

/// Strips leading/trailing whitespace and one layer of surrounding quotes.
fn clean_text(text: &str) -> String {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix(['"', '\'', '`'])
        .and_then(|s| s.strip_suffix(['"', '\'', '`']))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}

fn write_grouped(opts: &OutputOptions, path: &Path, matches: Vec<Match>) -> anyhow::Result<()> {
    let mut by_group: BTreeMap<String, Vec<Match>> = BTreeMap::new();
    for m in matches {
        by_group.entry(m.group.clone()).or_default().push(m);
    }

    let stem = path.file_stem().map_or_else(String::new, |s| s.to_string_lossy().into_owned());

    for (group, group_matches) in by_group {
        let file_name = format!("{stem}_{}.{}", sanitise_group(&group), opts.format.extension());
        let target = path.with_file_name(file_name);
        write_to_file(opts, &target, &group_matches)?;
    }

    Ok(())
}

fn sanitise_group(group: &str) -> String {
    group
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn write_to_file(opts: &OutputOptions, path: &Path, matches: &[Match]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating output file {}", path.display()))?;
    write_to(opts, file, matches)
}

fn write_to<W: Write>(opts: &OutputOptions, writer: W, matches: &[Match]) -> anyhow::Result<()> {
    let keys = if opts.keys.is_empty() {
        OutputKey::ALL.to_vec()
    } else {
        opts.keys.clone()
    };

    match opts.format {
        OutputFormat::Json => json::write(writer, matches, &keys),
        OutputFormat::Csv => csv_out::write(writer, matches, &keys),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_match(group: &str, matched: &str) -> Match {
        Match {
            file: "a.txt".to_string(),
            group: group.to_string(),
            rule_name: "rule".to_string(),
            matched: matched.to_string(),
            context: format!("ctx {matched} ctx"),
            position: 4,
            line_number: 1,
            sensitive: true,
        }
    }

    #[test]
    fn clean_text_strips_quotes_and_whitespace() {
        assert_eq!(clean_text("  \"secret-value\"  "), "secret-value");
        assert_eq!(clean_text("'secret-value'"), "secret-value");
        assert_eq!(clean_text("`secret-value`"), "secret-value");
    }

    #[test]
    fn clean_text_keeps_unpaired_quotes() {
        assert_eq!(clean_text("\"half-open"), "\"half-open");
        assert_eq!(clean_text("plain"), "plain");
    }

    #[test]
    fn blocklist_drops_matches_containing_word() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out.json");
        let opts = OutputOptions {
            output: Some(out.clone()),
            block_matches: vec!["EXAMPLE".to_string()],
            ..OutputOptions::default()
        };

        let matches = vec![make_match("g", "AKIAEXAMPLEKEY0000"), make_match("g", "AKIAREALKEY0000000")];
        process_results(&opts, matches).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(!written.contains("AKIAEXAMPLEKEY0000"));
        assert!(written.contains("AKIAREALKEY0000000"));
    }

    #[test]
    fn group_split_writes_one_file_per_group() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("results.json");
        let opts = OutputOptions {
            output: Some(out),
            group_split: true,
            ..OutputOptions::default()
        };

        let matches = vec![make_match("credentials", "token-one-abc"), make_match("network", "token-two-def")];
        process_results(&opts, matches).unwrap();

        assert!(dir.path().join("results_credentials.json").exists());
        assert!(dir.path().join("results_network.json").exists());
    }

    #[test]
    fn group_names_are_sanitised_for_filenames() {
        assert_eq!(sanitise_group("api/keys v2"), "api_keys_v2");
    }

    #[test]
    fn key_selection_restricts_json_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out.json");
        let opts = OutputOptions {
            output: Some(out.clone()),
            keys: vec![OutputKey::File, OutputKey::LineNumber],
            ..OutputOptions::default()
        };

        process_results(&opts, vec![make_match("g", "secret-value")]).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        let entry = &json[0];
        assert!(entry.get("file").is_some());
        assert!(entry.get("line_number").is_some());
        assert!(entry.get("match").is_none());
        assert!(entry.get("context").is_none());
    }

    #[test]
    fn csv_output_has_header_row() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out.csv");
        let opts = OutputOptions {
            format: OutputFormat::Csv,
            output: Some(out.clone()),
            ..OutputOptions::default()
        };

        process_results(&opts, vec![make_match("g", "secret-value")]).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            "file,group,rule_name,match,context,position,line_number,sensitive"
        );
        assert!(lines.next().unwrap().contains("secret-value"));
    }
}
