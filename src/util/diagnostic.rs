//! User-friendly diagnostic messages.
//!
//! Every user-visible failure carries its cause plus suggested manual
//! commands, never a bare OS error code.

use std::fmt;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Build commands for the WebAssembly artifacts.
    pub const BUILD_WASM_CONFIG: &str = "env CC=emcc make defconfig";

    /// Build command for the WebAssembly artifacts.
    pub const BUILD_WASM: &str = "env CC=emcc make";

    /// Pick another port instead of reclaiming this one.
    pub const OTHER_PORT: &str = "Use a different port with: --port XXXX";

    /// Manually kill whatever listens on `port`.
    pub fn kill_listener(port: u16) -> String {
        format!("Try manually: lsof -ti tcp:{} -sTCP:LISTEN | xargs kill", port)
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Warning,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        for ctx in &self.context {
            output.push_str(&format!("  -> {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("port 8000 is already in use")
            .with_context("found process(es) 4242")
            .with_suggestion(suggestions::kill_listener(8000))
            .with_suggestion(suggestions::OTHER_PORT);

        let output = diag.format(false);
        assert!(output.contains("error: port 8000 is already in use"));
        assert!(output.contains("-> found process(es) 4242"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Try manually: lsof -ti tcp:8000 -sTCP:LISTEN | xargs kill"));
        assert!(output.contains("2. Use a different port"));
    }

    #[test]
    fn test_warning_without_suggestions() {
        let diag = Diagnostic::warning("some build artifacts are missing");
        let output = diag.to_string();
        assert_eq!(output, "warning: some build artifacts are missing\n");
    }
}
