//! unpackcgi - unpacks `cgi_config.bin` configuration blobs from DVR/NVR
//! firmware into a directory tree.

mod cli;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use unpackcgi_core::ExtractConfig;
use unpackcgi_core::NoopProgress;
use unpackcgi_core::extract_container_with_progress;

use crate::error::add_blob_context;
use crate::progress::CliProgress;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let formatter = output::create_formatter(&cli);

    let config = ExtractConfig {
        max_file_count: cli.max_files,
        max_total_size: cli
            .max_total_size
            .unwrap_or(ExtractConfig::default().max_total_size),
        max_file_size: cli
            .max_file_size
            .unwrap_or(ExtractConfig::default().max_file_size),
        allow_symlinks: cli.allow_symlinks,
        preserve_permissions: cli.preserve_permissions,
        ..Default::default()
    };

    // Progress bar only when attached to a terminal and not emitting JSON
    let report = if CliProgress::should_show() && !cli.json && !cli.quiet {
        let mut progress = CliProgress::new("Unpacking");
        add_blob_context(
            extract_container_with_progress(&cli.firmware, &cli.output_dir, &config, &mut progress),
            &cli.firmware,
        )?
    } else {
        let mut noop = NoopProgress;
        add_blob_context(
            extract_container_with_progress(&cli.firmware, &cli.output_dir, &config, &mut noop),
            &cli.firmware,
        )?
    };

    formatter.format_extraction_result(&report)?;

    Ok(())
}
