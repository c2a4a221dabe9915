//! detect-compiler - report or check the family of the configured C compiler

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mado_devtools::toolchain::{identify, CompilerFamily, Identification, ToolchainSpec};

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let filter = if cli.verbose {
        EnvFilter::new("mado_devtools=debug")
    } else {
        EnvFilter::new("mado_devtools=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let identification = identify(&ToolchainSpec::from_env());

    let ok = match cli.expected {
        Some(expected) => check(&identification, expected),
        None => report(&identification),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print the family; succeed only if it is known.
fn report(identification: &Identification) -> bool {
    println!("{}", identification.family);
    identification.family.is_known()
}

/// Compare against `expected` without printing anything.
fn check(identification: &Identification, expected: CompilerFamily) -> bool {
    if !identification.has_output() {
        tracing::debug!(
            "No version output from `{}`; nothing to compare",
            identification.command_text
        );
        return false;
    }
    identification.family == expected
}
