//! Compiler version probing and family classification.

use std::time::Duration;

use crate::util::process::ProcessBuilder;

use super::{CompilerCommand, CompilerFamily, ToolchainSpec};

/// Upper bound on a `--version` probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Emscripten's driver name; its banner also embeds Clang's.
const EMSCRIPTEN_TOKEN: &str = "emcc";
const CLANG_TOKEN: &str = "clang";
const GCC_TOKEN: &str = "gcc";
/// Some GCC builds omit "gcc" from the banner but keep the copyright line.
const GNU_ATTRIBUTION: &str = "free software foundation";

/// Result of identifying the configured compiler.
#[derive(Debug, Clone)]
pub struct Identification {
    /// Command text before tokenization
    pub command_text: String,
    /// Captured `--version` output; empty when the probe failed
    pub version_output: String,
    pub family: CompilerFamily,
}

impl Identification {
    /// Whether the probe produced any output at all.
    pub fn has_output(&self) -> bool {
        !self.version_output.is_empty()
    }
}

/// Resolve, probe and classify the compiler described by `spec`.
pub fn identify(spec: &ToolchainSpec) -> Identification {
    let command_text = spec.command_text();
    tracing::debug!("Resolved compiler command: {}", command_text);

    let version_output = probe_version(&command_text, PROBE_TIMEOUT);
    let family = classify(&version_output);
    tracing::debug!("Classified compiler as {}", family);

    Identification {
        command_text,
        version_output,
        family,
    }
}

/// Run `<command> --version` and return its stdout.
///
/// Any failure (bad quoting, missing executable, timeout, non-zero exit)
/// yields an empty string.
pub fn probe_version(command_text: &str, timeout: Duration) -> String {
    let command = match CompilerCommand::parse(command_text) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!("Cannot tokenize compiler command `{}`: {}", command_text, e);
            return String::new();
        }
    };

    let Some(builder) = ProcessBuilder::from_argv(command.argv()) else {
        tracing::debug!("Compiler command `{}` is blank", command_text);
        return String::new();
    };
    let builder = builder.arg("--version");

    match builder.exec_with_timeout(timeout) {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).into_owned()
        }
        Ok(output) => {
            tracing::debug!(
                "`{}` exited with {:?}",
                builder.display_command(),
                output.status.code()
            );
            String::new()
        }
        Err(e) => {
            tracing::debug!("Compiler probe failed: {:#}", e);
            String::new()
        }
    }
}

/// Classify a compiler from its version banner.
///
/// Checked in priority order: Emscripten, Clang, GCC. The order matters
/// because the Emscripten banner contains "clang".
pub fn classify(version_output: &str) -> CompilerFamily {
    let lower = version_output.to_lowercase();

    if lower.contains(EMSCRIPTEN_TOKEN) {
        CompilerFamily::Emscripten
    } else if lower.contains(CLANG_TOKEN) {
        CompilerFamily::Clang
    } else if lower.contains(GCC_TOKEN) || lower.contains(GNU_ATTRIBUTION) {
        CompilerFamily::Gcc
    } else {
        CompilerFamily::Unknown
    }
}
