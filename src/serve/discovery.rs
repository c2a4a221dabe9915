//! Discovery of processes listening on a TCP port.
//!
//! Each platform has its own tooling, so discovery is a chain of
//! strategies: the first strategy whose tool is available decides the
//! result, and when none is available the answer is "no processes".
//!
//! | Platform | Strategies                              |
//! |----------|-----------------------------------------|
//! | Unix     | `lsof -sTCP:LISTEN`, then `ss -tlnp`    |
//! | Windows  | `netstat -ano -p tcp`                   |

use std::fmt;

use crate::util::process::{find_executable, ProcessBuilder};

/// A process found holding the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictingProcess {
    pub pid: u32,
}

impl ConflictingProcess {
    pub fn new(pid: u32) -> Self {
        ConflictingProcess { pid }
    }
}

impl fmt::Display for ConflictingProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pid)
    }
}

/// Finds the processes occupying a port.
///
/// Never fails: anything that goes wrong yields an empty list.
pub trait ProcessDiscovery {
    fn find(&self, port: u16) -> Vec<ConflictingProcess>;
}

/// One platform-specific way of finding port owners.
pub trait DiscoveryStrategy {
    /// Tool name, for logging.
    fn name(&self) -> &'static str;

    /// `None` when the tool is unavailable; the next strategy is tried.
    fn probe(&self, port: u16) -> Option<Vec<ConflictingProcess>>;
}

/// Tries strategies in order until one is available.
pub struct ChainedDiscovery {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl ChainedDiscovery {
    pub fn new(strategies: Vec<Box<dyn DiscoveryStrategy>>) -> Self {
        ChainedDiscovery { strategies }
    }

    /// Strategies appropriate for the current platform.
    pub fn platform_default() -> Self {
        #[cfg(windows)]
        let strategies: Vec<Box<dyn DiscoveryStrategy>> = vec![Box::new(Netstat)];

        #[cfg(not(windows))]
        let strategies: Vec<Box<dyn DiscoveryStrategy>> = vec![Box::new(Lsof), Box::new(Ss)];

        ChainedDiscovery::new(strategies)
    }
}

impl ProcessDiscovery for ChainedDiscovery {
    fn find(&self, port: u16) -> Vec<ConflictingProcess> {
        for strategy in &self.strategies {
            match strategy.probe(port) {
                Some(processes) => {
                    tracing::debug!(
                        "{} found {} process(es) on port {}",
                        strategy.name(),
                        processes.len(),
                        port
                    );
                    return processes;
                }
                None => {
                    tracing::debug!("{} unavailable, trying next strategy", strategy.name());
                }
            }
        }
        Vec::new()
    }
}

/// Run a discovery tool and return its stdout.
///
/// `None` when the tool is not on PATH or cannot be spawned. Exit status
/// is not checked: `lsof` exits 1 when nothing matches.
fn run_tool(name: &str, args: &[String]) -> Option<String> {
    find_executable(name)?;
    let builder = ProcessBuilder::new(name).args(args);
    match builder.exec() {
        Ok(output) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
        Err(e) => {
            tracing::debug!("{:#}", e);
            None
        }
    }
}

/// `lsof -ti tcp:PORT -sTCP:LISTEN`.
pub struct Lsof;

impl Lsof {
    /// Without the state filter lsof also reports peers connected to the
    /// port, such as the browser viewing the page.
    fn args(port: u16) -> Vec<String> {
        vec![
            "-ti".to_string(),
            format!("tcp:{}", port),
            "-sTCP:LISTEN".to_string(),
        ]
    }
}

impl DiscoveryStrategy for Lsof {
    fn name(&self) -> &'static str {
        "lsof"
    }

    fn probe(&self, port: u16) -> Option<Vec<ConflictingProcess>> {
        let stdout = run_tool("lsof", &Lsof::args(port))?;
        Some(parse_lsof(&stdout))
    }
}

/// `ss -tlnp "sport = :PORT"`.
pub struct Ss;

impl DiscoveryStrategy for Ss {
    fn name(&self) -> &'static str {
        "ss"
    }

    fn probe(&self, port: u16) -> Option<Vec<ConflictingProcess>> {
        let stdout = run_tool("ss", &["-tlnp".to_string(), format!("sport = :{}", port)])?;
        Some(parse_ss(&stdout))
    }
}

/// `netstat -ano -p tcp`.
pub struct Netstat;

impl DiscoveryStrategy for Netstat {
    fn name(&self) -> &'static str {
        "netstat"
    }

    fn probe(&self, port: u16) -> Option<Vec<ConflictingProcess>> {
        let args = ["-ano", "-p", "tcp"].map(String::from);
        let stdout = run_tool("netstat", &args)?;
        Some(parse_netstat(&stdout, port))
    }
}

fn push_unique(out: &mut Vec<ConflictingProcess>, pid: u32) {
    let process = ConflictingProcess::new(pid);
    if !out.contains(&process) {
        out.push(process);
    }
}

/// Parse `lsof -t` output: one PID per line.
pub fn parse_lsof(output: &str) -> Vec<ConflictingProcess> {
    let mut out = Vec::new();
    for line in output.lines() {
        if let Ok(pid) = line.trim().parse::<u32>() {
            push_unique(&mut out, pid);
        }
    }
    out
}

/// Parse `ss -p` output: every `pid=N` field on every row.
///
/// ```text
/// LISTEN 0 5 127.0.0.1:8000 0.0.0.0:* users:(("python3",pid=4242,fd=3))
/// ```
pub fn parse_ss(output: &str) -> Vec<ConflictingProcess> {
    let mut out = Vec::new();
    for line in output.lines() {
        for field in line.split("pid=").skip(1) {
            let digits: String = field.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(pid) = digits.parse::<u32>() {
                push_unique(&mut out, pid);
            }
        }
    }
    out
}

/// Parse `netstat -ano` output for rows listening on `port`.
///
/// ```text
///   TCP    127.0.0.1:8000    0.0.0.0:0    LISTENING    4242
/// ```
pub fn parse_netstat(output: &str, port: u16) -> Vec<ConflictingProcess> {
    let suffix = format!(":{}", port);
    let mut out = Vec::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [proto, local, _remote, state, pid] = fields.as_slice() else {
            continue;
        };
        if !proto.eq_ignore_ascii_case("tcp") || !local.ends_with(&suffix) {
            continue;
        }
        if !state.eq_ignore_ascii_case("listening") {
            continue;
        }
        if let Ok(pid) = pid.parse::<u32>() {
            push_unique(&mut out, pid);
        }
    }
    out
}
