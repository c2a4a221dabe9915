//! Mado developer tools
//!
//! Library support for the `detect-compiler` and `serve-wasm` helpers:
//! compiler family identification for the build, and a local preview
//! server for the WebAssembly output.

pub mod serve;
pub mod toolchain;
pub mod util;

/// Test doubles for the preview server's collaborators.
///
/// Only available when compiling tests.
#[cfg(test)]
pub mod test_support;

pub use serve::{PreviewServer, ServeError, ServeOptions};
pub use toolchain::{CompilerFamily, ToolchainSpec};
pub use util::shell::Shell;
