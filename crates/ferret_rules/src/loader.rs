//! Rule file loading and the embedded default rule set.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rule::RuleSet;

/// Built-in rule set shipped with the scanner, materialised by `ferret init`.
const DEFAULT_RULES_YAML: &str = include_str!("../rules/default.yaml");

/// Errors that can occur when reading or writing a rules file.
#[derive(Debug, Error)]
pub enum RuleFileError {
    /// The rules file could not be read from disk.
    #[error("failed to read rules file {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The rules file is not valid YAML or does not match the rule schema.
    #[error("failed to parse rules file {path}: {source}")]
    Parse {
        /// Path that was being parsed.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Refused to overwrite an existing rules file.
    #[error("rules file {path} already exists")]
    AlreadyExists {
        /// Path that already exists.
        path: PathBuf,
    },

    /// The rules file could not be written to disk.
    #[error("failed to write rules file {path}: {source}")]
    Write {
        /// Path that was being written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Loads a rule set from a YAML file.
pub fn load_rules(path: &Path) -> Result<RuleSet, RuleFileError> {
    let content = fs::read_to_string(path).map_err(|source| RuleFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| RuleFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the built-in rule set.
///
/// The embedded YAML is part of the crate and covered by tests, so a parse
/// failure here is a build defect rather than a runtime condition.
#[must_use]
#[expect(
    clippy::expect_used,
    reason = "the embedded rule file is validated by this crate's tests"
)]
pub fn default_rules() -> RuleSet {
    serde_yaml::from_str(DEFAULT_RULES_YAML).expect("embedded default rules are valid YAML")
}

/// Writes the built-in rule set to `path`, refusing to overwrite.
pub fn write_default_rules(path: &Path) -> Result<(), RuleFileError> {
    if path.exists() {
        return Err(RuleFileError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| RuleFileError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, DEFAULT_RULES_YAML).map_err(|source| RuleFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
