use std::net::{IpAddr, UdpSocket};
use std::sync::OnceLock;

const FALLBACK_HOST: &str = "127.0.0.1";

static LOCAL_HOST: OnceLock<String> = OnceLock::new();

/// Detected non-loopback address of this process, discovered once and cached
pub fn local_host() -> &'static str {
    LOCAL_HOST.get_or_init(|| detect_local_host().unwrap_or_else(|| FALLBACK_HOST.to_string()))
}

fn detect_local_host() -> Option<String> {
    // A connected UDP socket sends no traffic; it only asks the OS which
    // interface would route to a public address.
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let addr = socket.local_addr().ok()?;
    match addr.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip.to_string()),
        _ => None,
    }
}

/// Canonicalize loopback and any-local host forms to the detected local host
///
/// "localhost", "127.0.0.1" and "0.0.0.0" all map to the same representative
/// value so endpoint comparison treats them as this process's own address.
/// Everything else passes through unchanged.
pub fn filter_local_host(host: &str) -> String {
    if is_local_host(host) {
        local_host().to_string()
    } else {
        host.to_string()
    }
}

fn is_local_host(host: &str) -> bool {
    // a blank host is not canonicalized; it passes through verbatim
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    match host.parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback() || ip.is_unspecified(),
        Err(_) => false,
    }
}
