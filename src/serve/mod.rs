//! Local HTTP preview of WebAssembly build output.
//!
//! The server binds once. If the port is taken it looks up the owning
//! processes, asks before sending them a termination signal, waits for the
//! socket to be released and binds exactly one more time:
//!
//! ```text
//! Idle ──bind ok──────────────────────────────────────────▶ Serving ──Ctrl+C──▶ Stopped
//!  │
//!  ├─addr in use─▶ ConflictDetected ─killed ≥1─▶ Retrying ─ok─▶ Serving
//!  │                  │                            │
//!  │                  └─none found / declined /    └─err─▶ Failed
//!  │                    none killed ─────────────────────▶ Failed
//!  └─other error────────────────────────────────────────────▶ Failed
//! ```

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::util::diagnostic::Diagnostic;
use crate::util::shell::{Shell, Status};

pub mod artifacts;
pub mod bind;
pub mod browser;
pub mod discovery;
pub mod error;
pub mod http;
pub mod prompt;
pub mod terminate;

pub use bind::{is_addr_in_use, PortBinding};
pub use discovery::{ChainedDiscovery, ConflictingProcess, ProcessDiscovery};
pub use error::ServeError;
pub use prompt::{Confirm, Decline, StdinConfirm};
pub use terminate::{SignalTerminator, Terminate};

/// Time given to the OS to release a socket after its owner is terminated.
pub const SETTLE_INTERVAL: Duration = Duration::from_secs(1);

/// What to serve and where.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub web_dir: PathBuf,
    pub required_files: Vec<String>,
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
}

/// How the listener was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The first attempt succeeded.
    Bound,
    /// Bound on the retry after reclaiming the port.
    Reclaimed,
}

/// The preview server and its interactive collaborators.
pub struct PreviewServer {
    options: ServeOptions,
    shell: Shell,
    confirm: Box<dyn Confirm>,
    discovery: Box<dyn ProcessDiscovery>,
    terminator: Box<dyn Terminate>,
    settle: Duration,
}

impl PreviewServer {
    /// Create a server that declines every prompt.
    ///
    /// Use [`PreviewServer::with_confirm`] to attach a real prompt.
    pub fn new(options: ServeOptions, shell: Shell) -> Self {
        PreviewServer {
            options,
            shell,
            confirm: Box::new(Decline),
            discovery: Box::new(ChainedDiscovery::platform_default()),
            terminator: Box::new(SignalTerminator),
            settle: SETTLE_INTERVAL,
        }
    }

    pub fn with_confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    pub fn with_discovery(mut self, discovery: impl ProcessDiscovery + 'static) -> Self {
        self.discovery = Box::new(discovery);
        self
    }

    pub fn with_terminator(mut self, terminator: impl Terminate + 'static) -> Self {
        self.terminator = Box::new(terminator);
        self
    }

    pub fn with_settle_interval(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Prepare the web directory, confirming if artifacts are missing.
    pub fn preflight(&self) -> Result<(), ServeError> {
        artifacts::preflight(
            &self.shell,
            self.confirm.as_ref(),
            &self.options.web_dir,
            &self.options.required_files,
        )
    }

    /// Bind with `bind`, recovering from an occupied port at most once.
    pub fn bind_with_recovery<L, F>(
        &self,
        binding: &mut PortBinding,
        mut bind: F,
    ) -> Result<(L, BindOutcome), ServeError>
    where
        F: FnMut(&PortBinding) -> io::Result<L>,
    {
        let port = binding.port;

        match bind(binding) {
            Ok(listener) => {
                binding.bound = true;
                return Ok((listener, BindOutcome::Bound));
            }
            Err(e) if is_addr_in_use(&e) => {
                tracing::debug!("Bind on {} failed: {}", binding, e);
            }
            Err(e) => {
                return Err(ServeError::Bind {
                    addr: binding.to_string(),
                    source: e,
                });
            }
        }

        self.shell.error(format!("port {} is already in use", port));

        let processes = self.discovery.find(port);
        if processes.is_empty() {
            return Err(ServeError::PortConflictUnidentified { port });
        }

        let pids: Vec<String> = processes.iter().map(|p| p.to_string()).collect();
        self.shell.warn(format!(
            "found process(es) using port {}: {}",
            port,
            pids.join(", ")
        ));
        self.shell
            .note("this might be a previous instance of this server");

        if !self.confirm.confirm("Kill the process(es) and restart?") {
            return Err(ServeError::TerminationDeclined { port, processes });
        }

        let mut killed = 0;
        for process in &processes {
            if self.terminator.terminate(*process) {
                killed += 1;
                self.shell.status(Status::Killed, format!("process {}", process));
            } else {
                self.shell.error(format!("failed to kill process {}", process));
            }
        }
        if killed == 0 {
            return Err(ServeError::NothingTerminated { port, processes });
        }

        self.shell
            .wait("waiting for port to be released...", self.settle);

        match bind(binding) {
            Ok(listener) => {
                binding.bound = true;
                Ok((listener, BindOutcome::Reclaimed))
            }
            Err(source) => Err(ServeError::StillInUse { port, source }),
        }
    }

    /// Preflight, bind and serve until interrupted.
    pub fn run(&self) -> Result<(), ServeError> {
        self.preflight()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ServeError::Runtime)?;
        let _guard = runtime.enter();

        let mut binding = PortBinding::new(&self.options.host, self.options.port);
        let (listener, outcome) = self.bind_with_recovery(&mut binding, bind::bind_reuse)?;
        tracing::debug!("Listening on {} ({:?})", binding, outcome);

        self.print_banner(&binding);
        if self.options.open_browser {
            let url = format!("{}/index.html", binding.url());
            self.shell.status(Status::Opening, &url);
            if let Err(e) = browser::open(&url) {
                tracing::debug!("Failed to open browser: {:?}", e);
                let diag = Diagnostic::warning("could not open a browser")
                    .with_context(format!("{:#}", e))
                    .with_suggestion(format!("Open {} manually", url));
                eprint!("{}", diag.format(self.shell.use_color()));
            }
        }

        self.shell.status(Status::Serving, binding.url());
        let app = http::router(&self.options.web_dir);
        runtime
            .block_on(http::serve(listener, app))
            .map_err(ServeError::Serve)?;

        self.shell.status(Status::Stopped, "server shut down");
        Ok(())
    }

    fn print_banner(&self, binding: &PortBinding) {
        let rule = "=".repeat(70);
        let url = binding.url();

        println!();
        println!("{}", rule);
        println!("  Mado WebAssembly Development Server");
        println!("{}", rule);
        println!();
        println!("Serving directory: {}", self.options.web_dir.display());
        println!("Server address:    {}", url);
        println!("Direct URL:        {}/index.html", url);
        println!();
        if self.options.open_browser {
            println!("-> Opening browser automatically...");
        } else {
            println!("-> Open the URL above in your browser to test the WebAssembly build");
        }
        println!();
        println!("Instructions:");
        println!("  1. Make sure you have built the WebAssembly version:");
        println!("     env CC=emcc make");
        println!("  2. Build artifacts are automatically copied to assets/web/");
        println!("  3. Open the URL above in a modern browser");
        println!();
        println!("Supported browsers:");
        println!("  - Chrome/Chromium (recommended)");
        println!("  - Firefox");
        println!("  - Safari (macOS 11.3+)");
        println!();
        println!("Press Ctrl+C to stop the server");
        println!("{}", rule);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        addr_in_use, FixedDiscovery, RecordingTerminator, ScriptedBind, ScriptedConfirm,
    };
    use crate::util::shell::{ColorChoice, Verbosity};

    fn server() -> PreviewServer {
        let options = ServeOptions {
            web_dir: PathBuf::from("assets/web"),
            required_files: Vec::new(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            open_browser: false,
        };
        PreviewServer::new(options, Shell::new(Verbosity::Quiet, ColorChoice::Never))
            .with_settle_interval(Duration::ZERO)
    }

    fn binding() -> PortBinding {
        PortBinding::new("127.0.0.1", 8000)
    }

    #[test]
    fn test_first_bind_succeeds() {
        let discovery = FixedDiscovery::new([42]);
        let server = server().with_discovery(discovery.clone());
        let mut bind = ScriptedBind::new([Ok(8000)]);
        let mut binding = binding();

        let (listener, outcome) = server
            .bind_with_recovery(&mut binding, |_| bind.next())
            .unwrap();

        assert_eq!(listener, 8000);
        assert_eq!(outcome, BindOutcome::Bound);
        assert!(binding.bound);
        assert_eq!(bind.attempts, 1);
        assert_eq!(discovery.lookups(), 0);
    }

    #[test]
    fn test_no_candidates_fails_without_retry() {
        let confirm = ScriptedConfirm::new([true]);
        let server = server()
            .with_discovery(FixedDiscovery::default())
            .with_confirm(confirm.clone());
        let mut bind = ScriptedBind::new([Err(addr_in_use()), Ok(8000)]);
        let mut binding = binding();

        let err = server
            .bind_with_recovery(&mut binding, |_| bind.next())
            .unwrap_err();

        assert!(matches!(err, ServeError::PortConflictUnidentified { port: 8000 }));
        assert_eq!(bind.attempts, 1);
        assert!(confirm.questions().is_empty());
        assert!(!binding.bound);
    }

    #[test]
    fn test_declined_sends_no_signal() {
        let terminator = RecordingTerminator::default();
        let confirm = ScriptedConfirm::new([false]);
        let server = server()
            .with_discovery(FixedDiscovery::new([4242]))
            .with_confirm(confirm.clone())
            .with_terminator(terminator.clone());
        let mut bind = ScriptedBind::new([Err(addr_in_use()), Ok(8000)]);
        let mut binding = binding();

        let err = server
            .bind_with_recovery(&mut binding, |_| bind.next())
            .unwrap_err();

        assert!(matches!(err, ServeError::TerminationDeclined { port: 8000, .. }));
        assert!(terminator.calls().is_empty());
        assert_eq!(confirm.questions().len(), 1);
        assert_eq!(bind.attempts, 1);
    }

    #[test]
    fn test_default_confirm_declines() {
        let terminator = RecordingTerminator::default();
        let server = server()
            .with_discovery(FixedDiscovery::new([4242]))
            .with_terminator(terminator.clone());
        let mut bind = ScriptedBind::new([Err(addr_in_use())]);

        let err = server
            .bind_with_recovery(&mut binding(), |_| bind.next())
            .unwrap_err();

        assert!(matches!(err, ServeError::TerminationDeclined { .. }));
        assert!(terminator.calls().is_empty());
    }

    #[test]
    fn test_reclaim_retries_exactly_once() {
        let terminator = RecordingTerminator::default();
        let server = server()
            .with_discovery(FixedDiscovery::new([41, 42]))
            .with_confirm(ScriptedConfirm::new([true]))
            .with_terminator(terminator.clone());
        let mut bind = ScriptedBind::new([Err(addr_in_use()), Ok(8000)]);
        let mut binding = binding();

        let (_, outcome) = server
            .bind_with_recovery(&mut binding, |_| bind.next())
            .unwrap();

        assert_eq!(outcome, BindOutcome::Reclaimed);
        assert_eq!(terminator.calls(), vec![41, 42]);
        assert_eq!(bind.attempts, 2);
        assert!(binding.bound);
    }

    #[test]
    fn test_partial_termination_still_retries() {
        let terminator = RecordingTerminator::failing([41]);
        let server = server()
            .with_discovery(FixedDiscovery::new([41, 42]))
            .with_confirm(ScriptedConfirm::new([true]))
            .with_terminator(terminator.clone());
        let mut bind = ScriptedBind::new([Err(addr_in_use()), Ok(8000)]);

        let (_, outcome) = server
            .bind_with_recovery(&mut binding(), |_| bind.next())
            .unwrap();

        assert_eq!(outcome, BindOutcome::Reclaimed);
        assert_eq!(terminator.calls(), vec![41, 42]);
    }

    #[test]
    fn test_nothing_terminated_fails_without_retry() {
        let server = server()
            .with_discovery(FixedDiscovery::new([41]))
            .with_confirm(ScriptedConfirm::new([true]))
            .with_terminator(RecordingTerminator::failing([41]));
        let mut bind = ScriptedBind::new([Err(addr_in_use()), Ok(8000)]);

        let err = server
            .bind_with_recovery(&mut binding(), |_| bind.next())
            .unwrap_err();

        assert!(matches!(err, ServeError::NothingTerminated { port: 8000, .. }));
        assert_eq!(bind.attempts, 1);
    }

    #[test]
    fn test_failed_retry_is_final() {
        let discovery = FixedDiscovery::new([41]);
        let confirm = ScriptedConfirm::new([true, true, true]);
        let server = server()
            .with_discovery(discovery.clone())
            .with_confirm(confirm.clone())
            .with_terminator(RecordingTerminator::default());
        let mut bind = ScriptedBind::new([Err(addr_in_use()), Err(addr_in_use()), Ok(8000)]);

        let err = server
            .bind_with_recovery(&mut binding(), |_| bind.next())
            .unwrap_err();

        assert!(matches!(err, ServeError::StillInUse { port: 8000, .. }));
        assert_eq!(bind.attempts, 2);
        assert_eq!(discovery.lookups(), 1);
        assert_eq!(confirm.questions().len(), 1);
    }

    #[test]
    fn test_other_bind_errors_are_fatal() {
        let discovery = FixedDiscovery::new([41]);
        let server = server().with_discovery(discovery.clone());
        let mut bind = ScriptedBind::new([
            Err(io::Error::from(io::ErrorKind::PermissionDenied)),
            Ok(8000),
        ]);

        let err = server
            .bind_with_recovery(&mut binding(), |_| bind.next())
            .unwrap_err();

        assert!(matches!(err, ServeError::Bind { .. }));
        assert_eq!(bind.attempts, 1);
        assert_eq!(discovery.lookups(), 0);
    }

    #[test]
    fn test_raw_linux_code_is_a_conflict() {
        let server = server().with_discovery(FixedDiscovery::default());
        let mut bind = ScriptedBind::new([Err(io::Error::from_raw_os_error(98))]);

        let err = server
            .bind_with_recovery(&mut binding(), |_| bind.next())
            .unwrap_err();

        assert!(matches!(err, ServeError::PortConflictUnidentified { .. }));
    }

    #[test]
    fn test_settle_interval_default() {
        assert_eq!(SETTLE_INTERVAL, Duration::from_secs(1));
    }

    #[test]
    fn test_real_listener_conflict_is_detected() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = runtime.enter();

        let held = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = held.local_addr().unwrap().port();

        let terminator = RecordingTerminator::default();
        let server = server()
            .with_discovery(FixedDiscovery::default())
            .with_terminator(terminator.clone());
        let mut binding = PortBinding::new("127.0.0.1", port);

        let err = server
            .bind_with_recovery(&mut binding, bind::bind_reuse)
            .unwrap_err();

        assert!(matches!(err, ServeError::PortConflictUnidentified { port: p } if p == port));
        assert!(terminator.calls().is_empty());
    }
}
