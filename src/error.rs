use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Fatal setup failures: there is no address to probe.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid host `{0}`")]
    InvalidHost(String),
    #[error("lookup {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("lookup {0}: no addresses found")]
    NoAddress(String),
}

/// Why a single probe failed. Recoverable: the next tick probes again.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("dial tcp {addr}: i/o timeout after {} ms", .timeout.as_millis())]
    Timeout { addr: SocketAddr, timeout: Duration },
    #[error("dial tcp {addr}: connection refused")]
    Refused { addr: SocketAddr },
    #[error("dial tcp {addr}: {source}")]
    Unreachable {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("dial tcp {addr}: {source}")]
    Io {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    /// Sorts a connect error into the failure kinds we distinguish.
    pub fn from_io(addr: SocketAddr, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::ConnectionRefused => ProbeError::Refused { addr },
            io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable => {
                ProbeError::Unreachable { addr, source }
            }
            _ => ProbeError::Io { addr, source },
        }
    }
}

#[derive(Error, Debug)]
pub enum TcpingError {
    #[error("failed to resolve target")]
    Resolve(#[from] ResolveError),
    #[error("failed to write report")]
    Output(#[from] io::Error),
}
