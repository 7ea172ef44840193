#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use tsz_cli::args::CliArgs;
use tsz_cli::driver::{self, ExitStatus};
use tsz_cli::reporter::{Reporter, diagnostic_from_error};

fn main() -> Result<()> {
    // Only installs a subscriber when TSZ_LOG or RUST_LOG is set.
    tsz_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let pretty = args
        .pretty
        .unwrap_or_else(|| std::io::stderr().is_terminal());

    let result = match driver::compile(&args, &cwd) {
        Ok(result) => result,
        Err(error) => {
            let reporter = Reporter::new(pretty);
            eprint!("{}", reporter.render(&[diagnostic_from_error(&error)]));
            std::process::exit(ExitStatus::DiagnosticsPresentOutputsSkipped.code());
        }
    };

    if args.list_files {
        for file in &result.files {
            println!("{}", file.file_name);
        }
    }

    if !result.diagnostics.is_empty() {
        let reporter = Reporter::new(pretty).with_sources(&result.files);
        // render() already ends every diagnostic with a newline
        eprint!("{}", reporter.render(&result.diagnostics));
    }

    std::process::exit(result.exit_status.code());
}
