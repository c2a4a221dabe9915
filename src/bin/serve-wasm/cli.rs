//! CLI definitions using clap.

use clap::Parser;

/// Serve the WebAssembly build with cross-origin isolation headers
#[derive(Parser, Debug)]
#[command(name = "serve-wasm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Open the page in the default browser once serving
    #[arg(long)]
    pub open: bool,

    /// Address to bind [default: 127.0.0.1]
    #[arg(long)]
    pub host: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
