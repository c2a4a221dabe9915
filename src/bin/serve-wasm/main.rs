//! serve-wasm - local preview server for the WebAssembly build

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mado_devtools::serve::{PreviewServer, ServeOptions, StdinConfirm};
use mado_devtools::util::config::{project_serve_config_path, ServeConfig, ServeSettings};
use mado_devtools::util::fs::current_dir;
use mado_devtools::util::shell::Shell;

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

    let shell = Shell::from_flags(cli.verbose, cli.no_color);
    let use_color = shell.use_color();
    let server = PreviewServer::new(options(&cli), shell).with_confirm(StdinConfirm);

    match server.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Server failed: {:?}", e);
            eprintln!("{}", e.to_diagnostic().format(use_color));
            ExitCode::FAILURE
        }
    }
}

/// Command-line flags over `.mado/serve.toml` over built-in defaults.
fn options(cli: &Cli) -> ServeOptions {
    let root = current_dir();
    let mut config = ServeConfig::load_or_default(&project_serve_config_path(&root));
    config.merge(ServeConfig {
        serve: ServeSettings {
            host: cli.host.clone(),
            port: cli.port,
            ..ServeSettings::default()
        },
    });

    ServeOptions {
        web_dir: config.web_dir(&root),
        required_files: config.required_files(),
        host: config.host(),
        port: config.port(),
        open_browser: cli.open,
    }
}
