//! Preflight check of the served directory.
//!
//! Advisory only: a missing artifact prompts the user, it does not
//! validate what the artifacts contain.

use std::path::Path;

use crate::util::diagnostic::suggestions;
use crate::util::fs::{ensure_dir, missing_files};
use crate::util::shell::{Shell, Status};

use super::error::ServeError;
use super::prompt::Confirm;

/// Create `web_dir` if needed and confirm before serving without artifacts.
pub fn preflight(
    shell: &Shell,
    confirm: &dyn Confirm,
    web_dir: &Path,
    required: &[String],
) -> Result<(), ServeError> {
    if !web_dir.is_dir() {
        shell.warn(format!("{} not found, creating it", web_dir.display()));
    }
    if ensure_dir(web_dir)? {
        shell.status(Status::Created, web_dir.display());
    }

    let missing = missing_files(web_dir, required);
    if missing.is_empty() {
        shell.status(Status::Finished, "all required files found");
        return Ok(());
    }

    shell.warn("some required files are missing:");
    for name in &missing {
        eprintln!("{:>14} {}", "x", name);
    }
    eprintln!();
    eprintln!("Build the WebAssembly version first:");
    eprintln!("  {}", suggestions::BUILD_WASM_CONFIG);
    eprintln!("  {}", suggestions::BUILD_WASM);
    eprintln!();

    if confirm.confirm("Continue anyway?") {
        Ok(())
    } else {
        Err(ServeError::Aborted {
            web_dir: web_dir.display().to_string(),
            missing,
        })
    }
}
