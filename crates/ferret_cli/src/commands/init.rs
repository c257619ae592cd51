//! Init command - materialises the built-in rule set.

use ferret_rules::write_default_rules;

use crate::InitArgs;
use crate::ui;

/// Executes the `ferret init` command. Refuses to overwrite an existing
/// rules file.
pub fn run(args: &InitArgs) -> super::Result {
    write_default_rules(&args.rules)?;

    ui::print_success(&format!("rules file created at {}", args.rules.display()));
    ui::print_info("review the rules, then run `ferret scan` to scan the current directory");

    Ok(())
}
