//! Scan command - runs a rule set over file trees.

use std::time::Instant;

use anyhow::{Context as _, bail};
use ferret_core::prelude::*;

use crate::ScanArgs;
use crate::files::{CollectOptions, collect_files};
use crate::output::{OutputOptions, process_results};
use crate::ui::{self, pluralise_word};

/// Executes the `ferret scan` command.
pub fn run(args: &ScanArgs) -> super::Result {
    let rules = load_and_filter_rules(args)?;
    let start = Instant::now();

    let files = collect_files(
        &args.paths,
        &CollectOptions {
            exclude_ext: args.exclude_ext.clone(),
            exclude_path: args.exclude_path.clone(),
            limit_size_mb: args.limit_size,
        },
    );

    if files.is_empty() {
        ui::print_warning("no files to scan; check the paths and exclude filters");
        return Ok(());
    }
    ui::print_info(&format!(
        "scanning {} {} with {} {}",
        files.len(),
        pluralise_word(files.len(), "file", "files"),
        rules.rule_count(),
        pluralise_word(rules.rule_count(), "rule", "rules"),
    ));

    let config = ScanConfig {
        workers: args.workers,
        chunk_limit_mb: args.chunk_limit,
        save_cache: args.cached,
        cache_path: args.cache_file.clone(),
    };
    let scanner = Scanner::new(&rules, &config).context("compiling rules")?;

    // The bar draws on stderr, so it never corrupts results on stdout.
    let show_progress = console::Term::stderr().is_term();
    let progress = show_progress.then(|| ui::create_file_progress(files.len()));

    let matches = scanner.scan_with_progress(&files, |job| {
        if let Some(error) = &job.error {
            tracing::warn!(file = %job.file.display(), %error, "file skipped");
        }
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    });

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let elapsed = start.elapsed();

    let match_count = process_results(
        &OutputOptions {
            format: args.format,
            output: args.output.clone(),
            keys: args.output_keys.clone(),
            block_matches: args.block_matches.clone(),
            clean: args.format_results,
            group_split: args.output_group,
        },
        matches,
    )?;

    if args.output.is_some() {
        ui::print_success(&format!(
            "{} {} in {} {} ({:.2}s)",
            match_count,
            pluralise_word(match_count, "match", "matches"),
            files.len(),
            pluralise_word(files.len(), "file", "files"),
            elapsed.as_secs_f64(),
        ));
    }

    Ok(())
}

fn load_and_filter_rules(args: &ScanArgs) -> super::Result<RuleSet> {
    if !args.rules.exists() {
        bail!(
            "rules file {} not found; run `ferret init` to create one",
            args.rules.display()
        );
    }

    let rules = ferret_rules::load_rules(&args.rules)?;
    if rules.is_empty() {
        bail!("rules file {} contains no loaded rules", args.rules.display());
    }

    let shape_problems = rules.shape_problems();
    if !shape_problems.is_empty() {
        bail!("invalid rules:\n  {}", shape_problems.join("\n  "));
    }

    let compile_problems = RuleEngine::validate(&rules);
    if !compile_problems.is_empty() {
        bail!("rules failed to compile:\n  {}", compile_problems.join("\n  "));
    }

    let filtered = rules.filtered(&FilterOptions {
        groups: args.filter_groups.clone(),
        names: args.filter_names.clone(),
        sensitive_only: args.sensitive_only,
    });
    if filtered.is_empty() {
        bail!("no rules selected; check the group/name/sensitive filters");
    }

    Ok(filtered)
}
