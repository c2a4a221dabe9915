//! CLI definitions using clap.

use clap::Parser;

use mado_devtools::toolchain::CompilerFamily;

/// Identify the C compiler selected by CC and CROSS_COMPILE
#[derive(Parser, Debug)]
#[command(name = "detect-compiler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Exit successfully only if the compiler belongs to FAMILY
    /// (GCC, Clang, Emscripten; case-insensitive)
    #[arg(long = "is", value_name = "FAMILY")]
    pub expected: Option<CompilerFamily>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
