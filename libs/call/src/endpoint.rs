use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Socket endpoint that may or may not carry a resolved IP
///
/// An unresolved endpoint holds only the literal host string; no DNS lookup
/// is ever performed by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointAddr {
    host: String,
    port: u16,
    ip: Option<IpAddr>,
}

impl EndpointAddr {
    /// Create an endpoint from a literal host without resolving it
    pub fn unresolved(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ip: None,
        }
    }

    /// Create an endpoint carrying a resolved IP
    pub fn resolved(ip: IpAddr, port: u16) -> Self {
        Self {
            host: ip.to_string(),
            port,
            ip: Some(ip),
        }
    }

    /// Parse a `"host:port"` string; a missing or malformed port clamps to 0
    /// rather than failing
    pub fn parse(s: &str) -> Self {
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().unwrap_or(0)),
            None => (s, 0),
        };
        match host.parse::<IpAddr>() {
            Ok(ip) => Self::resolved(ip, port),
            Err(_) => Self::unresolved(host, port),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    /// Host form used for endpoint comparison: the numeric address when the
    /// endpoint is resolved, the literal host otherwise
    pub fn host_for_compare(&self) -> String {
        match self.ip {
            Some(ip) => ip.to_string(),
            None => self.host.clone(),
        }
    }
}

impl From<SocketAddr> for EndpointAddr {
    fn from(addr: SocketAddr) -> Self {
        Self::resolved(addr.ip(), addr.port())
    }
}

impl From<(&str, u16)> for EndpointAddr {
    fn from((host, port): (&str, u16)) -> Self {
        Self::unresolved(host, port)
    }
}

impl From<(String, u16)> for EndpointAddr {
    fn from((host, port): (String, u16)) -> Self {
        Self::unresolved(host, port)
    }
}

impl fmt::Display for EndpointAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// URL-like service endpoint descriptor
///
/// Produced by address resolution elsewhere; this crate only reads and
/// compares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUrl {
    ip: String,
    port: u16,
}

impl ServiceUrl {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}
