use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::error::ResolveError;

/// Resolved address to probe, plus the name the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub domain: String,
    pub addr: SocketAddr,
}

impl Target {
    pub fn new(domain: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            domain: domain.into(),
            addr,
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.domain, self.addr.ip())
    }
}

/// Anything the resolver could match: alphanumerics, dots, hyphens and
/// underscores (hosts-file aliases use them).
fn validate_hostname(hostname: &str) -> Result<&str, ResolveError> {
    let valid = !hostname.is_empty()
        && hostname
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'));

    if valid {
        Ok(hostname)
    } else {
        Err(ResolveError::InvalidHost(hostname.to_string()))
    }
}

/// Turns a domain or literal IP into the address that will be probed.
///
/// Literal addresses skip the resolver. For names, the first address the
/// system resolver returns wins.
pub async fn resolve_target(domain: &str, port: u16) -> Result<Target, ResolveError> {
    if let Ok(ip) = domain.parse::<IpAddr>() {
        return Ok(Target::new(domain, SocketAddr::new(ip, port)));
    }

    let hostname = validate_hostname(domain)?;
    let mut addrs = tokio::net::lookup_host((hostname, port))
        .await
        .map_err(|source| ResolveError::Lookup {
            host: hostname.to_string(),
            source,
        })?;

    let addr = addrs
        .next()
        .ok_or_else(|| ResolveError::NoAddress(hostname.to_string()))?;
    log::debug!("resolved {domain} to {addr}");

    Ok(Target::new(domain, addr))
}
