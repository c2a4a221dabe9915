//! Listener binding and address-in-use detection.

use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use tokio::net::{TcpListener, TcpSocket};

/// Pending connection queue length.
const BACKLOG: u32 = 1024;

/// `EADDRINUSE` on macOS/BSD.
const EADDRINUSE_BSD: i32 = 48;
/// `EADDRINUSE` on Linux.
const EADDRINUSE_LINUX: i32 = 98;
/// `WSAEADDRINUSE` on Windows.
const WSAEADDRINUSE: i32 = 10048;

/// A host/port pair the server tries to listen on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    pub host: String,
    pub port: u16,
    /// Set once a listener is held for this pair
    pub bound: bool,
}

impl PortBinding {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        PortBinding {
            host: host.into(),
            port,
            bound: false,
        }
    }

    /// Resolve the host to the first matching socket address.
    pub fn socket_addr(&self) -> io::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("host `{}` did not resolve to any address", self.host),
                )
            })
    }

    /// Base URL of the server.
    pub fn url(&self) -> String {
        format!("http://{}", self)
    }
}

impl fmt::Display for PortBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Bind a listener that can restart into a port still in `TIME_WAIT`.
///
/// `SO_REUSEADDR` is only set on Unix. On Windows it would let a second
/// socket take over a port another listener still holds, hiding the
/// conflict; std's listener makes the same distinction.
///
/// Must be called inside a tokio runtime context.
pub fn bind_reuse(binding: &PortBinding) -> io::Result<TcpListener> {
    let addr = binding.socket_addr()?;
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    #[cfg(unix)]
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(BACKLOG)
}

/// Whether a bind error means another socket already holds the address.
pub fn is_addr_in_use(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::AddrInUse
        || matches!(
            err.raw_os_error(),
            Some(EADDRINUSE_BSD | EADDRINUSE_LINUX | WSAEADDRINUSE)
        )
}
