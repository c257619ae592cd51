//! UI helpers for consistent output formatting.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Semantic colour palette for terminal output.
pub mod colors {
    use console::Style;

    /// Red - errors.
    pub fn error() -> Style {
        Style::new().red()
    }

    /// Yellow - warnings and skipped files.
    pub fn warning() -> Style {
        Style::new().yellow()
    }

    /// Cyan - informational messages.
    pub fn info() -> Style {
        Style::new().cyan()
    }

    /// Green - success messages.
    pub fn success() -> Style {
        Style::new().green()
    }
}

/// Prints a red error message to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", colors::error().apply_to("✖"), message);
}

/// Prints a yellow warning message to stderr.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", colors::warning().apply_to("⚠"), message);
}

/// Prints a cyan informational message to stderr, keeping stdout clean for
/// results.
pub fn print_info(message: &str) {
    eprintln!("{} {}", colors::info().apply_to("ℹ"), message);
}

/// Prints a green success message to stderr.
pub fn print_success(message: &str) {
    eprintln!("{} {}", colors::success().apply_to("✓"), message);
}

const PROGRESS_TICK_MS: u64 = 100;

/// Creates a progress bar for file scanning with the given total file count.
#[must_use]
pub fn create_file_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);

    #[expect(
        clippy::expect_used,
        reason = "static template string; failure is a programmer error"
    )]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/243} {percent:>3}% {pos}/{len} files ({elapsed} elapsed)")
            .expect("invalid progress template")
            .progress_chars("━━╸"),
    );

    pb.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
    pb
}

/// Returns `singular` when `count` is 1, otherwise `plural`.
#[must_use]
pub const fn pluralise_word<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}
