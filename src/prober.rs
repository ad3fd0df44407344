use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{Instant, timeout};

use crate::error::ProbeError;
use crate::ping::ProbeResult;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Issues one probe against `target`. No retries: the caller decides what
/// happens next.
pub trait Prober {
    fn probe(&mut self, target: SocketAddr, limit: Duration) -> impl Future<Output = ProbeResult>;
}

/// Probes by completing a TCP handshake and closing the socket straight away.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProber;

impl TcpProber {
    pub fn new() -> Self {
        Self
    }
}

impl Prober for TcpProber {
    async fn probe(&mut self, target: SocketAddr, limit: Duration) -> ProbeResult {
        let start = Instant::now();
        let outcome = timeout(limit, TcpStream::connect(target)).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(Ok(stream)) => {
                drop(stream);
                log::debug!("connected to {target} in {elapsed:?}");
                ProbeResult::Success(elapsed)
            }
            Ok(Err(source)) => {
                log::debug!("connect to {target} failed after {elapsed:?}: {source}");
                ProbeResult::Failure(ProbeError::from_io(target, source))
            }
            Err(_) => {
                log::debug!("connect to {target} timed out after {elapsed:?}");
                ProbeResult::Failure(ProbeError::Timeout {
                    addr: target,
                    timeout: limit,
                })
            }
        }
    }
}
