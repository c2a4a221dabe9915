//! Compiler toolchain identification.
//!
//! The effective compiler is resolved from the environment with this
//! precedence:
//! 1. `CC` (explicit override, used verbatim)
//! 2. `CROSS_COMPILE` + `gcc`
//! 3. `cc`
//!
//! The resolved command is run with `--version` and the banner is
//! classified into a [`CompilerFamily`].

use std::fmt;
use std::str::FromStr;

mod detect;

pub use detect::{classify, identify, probe_version, Identification, PROBE_TIMEOUT};

/// Environment variable holding the cross-toolchain prefix.
pub const CROSS_COMPILE_VAR: &str = "CROSS_COMPILE";

/// Environment variable holding the compiler override.
pub const CC_VAR: &str = "CC";

/// Compiler used when nothing is configured.
pub const DEFAULT_COMPILER: &str = "cc";

/// The broad lineage of a C compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompilerFamily {
    /// GNU Compiler Collection
    Gcc,
    /// Clang/LLVM
    Clang,
    /// Emscripten's WebAssembly driver
    Emscripten,
    /// Nothing recognizable
    Unknown,
}

impl CompilerFamily {
    /// Get the family name as printed by `detect-compiler`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Gcc => "GCC",
            CompilerFamily::Clang => "Clang",
            CompilerFamily::Emscripten => "Emscripten",
            CompilerFamily::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != CompilerFamily::Unknown
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gcc" => Ok(CompilerFamily::Gcc),
            "clang" => Ok(CompilerFamily::Clang),
            "emscripten" => Ok(CompilerFamily::Emscripten),
            "unknown" => Ok(CompilerFamily::Unknown),
            _ => Err(format!(
                "invalid compiler family '{}'; expected 'GCC', 'Clang', or 'Emscripten'",
                s
            )),
        }
    }
}

/// Toolchain settings read from the environment.
///
/// Recomputed on every invocation; an empty value counts as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainSpec {
    /// Cross-toolchain prefix, e.g. `arm-none-eabi-`
    pub cross_prefix: String,
    /// Compiler command override, e.g. `ccache clang`
    pub cc_override: String,
}

impl ToolchainSpec {
    pub fn new(cross_prefix: impl Into<String>, cc_override: impl Into<String>) -> Self {
        ToolchainSpec {
            cross_prefix: cross_prefix.into(),
            cc_override: cc_override.into(),
        }
    }

    /// Read `CROSS_COMPILE` and `CC` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        ToolchainSpec {
            cross_prefix: lookup(CROSS_COMPILE_VAR).unwrap_or_default(),
            cc_override: lookup(CC_VAR).unwrap_or_default(),
        }
    }

    /// The compiler command text, before tokenization.
    ///
    /// A non-empty override always wins over the prefix.
    pub fn command_text(&self) -> String {
        if !self.cc_override.is_empty() {
            self.cc_override.clone()
        } else if !self.cross_prefix.is_empty() {
            format!("{}gcc", self.cross_prefix)
        } else {
            DEFAULT_COMPILER.to_string()
        }
    }
}

/// A compiler invocation split into argv tokens.
///
/// Wrapped compilers such as `ccache clang` become several tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    argv: Vec<String>,
}

impl CompilerCommand {
    /// Tokenize `text` with shell quoting rules.
    ///
    /// Fails on unbalanced quotes. Whitespace-only text yields an empty
    /// command, which nothing can run.
    pub fn parse(text: &str) -> Result<Self, shell_words::ParseError> {
        let argv = shell_words::split(text)?;
        Ok(CompilerCommand { argv })
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl fmt::Display for CompilerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_words::join(&self.argv))
    }
}
