//! Output formatting module.
//!
//! `--json` selects the machine-readable formatter; everything else gets
//! console-styled output honoring `--quiet` and `--verbose`.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use crate::cli::Cli;
use human::HumanFormatter;
use json::JsonFormatter;

/// Creates the output formatter selected by the command-line flags
pub fn create_formatter(cli: &Cli) -> Box<dyn OutputFormatter> {
    if cli.json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter::new(cli.verbose, cli.quiet))
    }
}
