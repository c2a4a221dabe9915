//! Launching the platform browser.

use anyhow::Result;

use crate::util::process::ProcessBuilder;

/// The platform opener command for `url`.
pub fn opener(url: &str) -> ProcessBuilder {
    if cfg!(target_os = "macos") {
        ProcessBuilder::new("open").arg(url)
    } else if cfg!(windows) {
        // the empty argument is the window title
        ProcessBuilder::new("cmd").args(["/C", "start", "", url])
    } else {
        ProcessBuilder::new("xdg-open").arg(url)
    }
}

/// Open `url` in the default browser without waiting for it.
pub fn open(url: &str) -> Result<()> {
    opener(url).spawn_detached()
}
