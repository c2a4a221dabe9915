//! Preview server failures.

use std::io;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

use super::discovery::ConflictingProcess;

/// Why the preview server stopped without serving.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Build artifacts were missing and the user chose not to continue.
    #[error("aborted: {} required file(s) missing from {web_dir}", missing.len())]
    Aborted {
        web_dir: String,
        missing: Vec<String>,
    },

    #[error("port {port} is already in use and no owning process was found")]
    PortConflictUnidentified { port: u16 },

    #[error("port {port} is already in use")]
    TerminationDeclined {
        port: u16,
        processes: Vec<ConflictingProcess>,
    },

    #[error("port {port} is already in use and no process using it could be killed")]
    NothingTerminated {
        port: u16,
        processes: Vec<ConflictingProcess>,
    },

    /// The single retry after terminating the owners failed too.
    #[error("still cannot bind to port {port}")]
    StillInUse {
        port: u16,
        #[source]
        source: io::Error,
    },

    /// A bind failure other than address-in-use; never retried.
    #[error("failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to start the server runtime")]
    Runtime(#[source] io::Error),

    #[error("server error")]
    Serve(#[source] io::Error),

    #[error(transparent)]
    Setup(#[from] anyhow::Error),
}

impl ServeError {
    /// A user-facing diagnostic with manual remediation steps.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ServeError::Aborted { missing, .. } => missing
                .iter()
                .fold(diag, |d, name| d.with_context(format!("missing {}", name)))
                .with_suggestion(format!("Build first: {}", suggestions::BUILD_WASM_CONFIG))
                .with_suggestion(format!("Then: {}", suggestions::BUILD_WASM)),
            ServeError::PortConflictUnidentified { port } => diag
                .with_suggestion(suggestions::kill_listener(*port))
                .with_suggestion(suggestions::OTHER_PORT),
            ServeError::TerminationDeclined { processes, .. } => diag
                .with_context(format!("used by process(es) {}", join_pids(processes)))
                .with_suggestion(suggestions::OTHER_PORT),
            ServeError::NothingTerminated { port, processes } => diag
                .with_context(format!("used by process(es) {}", join_pids(processes)))
                .with_suggestion(suggestions::kill_listener(*port))
                .with_suggestion(suggestions::OTHER_PORT),
            ServeError::StillInUse { port, source } => diag
                .with_context(source.to_string())
                .with_suggestion(suggestions::kill_listener(*port))
                .with_suggestion(suggestions::OTHER_PORT),
            ServeError::Bind { source, .. }
            | ServeError::Runtime(source)
            | ServeError::Serve(source) => diag.with_context(source.to_string()),
            ServeError::Setup(e) => Diagnostic::error(format!("{:#}", e)),
        }
    }
}

fn join_pids(processes: &[ConflictingProcess]) -> String {
    processes
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
