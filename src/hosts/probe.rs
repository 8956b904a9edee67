use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

/// Reachability check for a single candidate host.
///
/// A host is either reachable or not per call; implementations never retry.
pub trait ReachabilityProbe {
    fn probe(&self, host: &str) -> bool;
}

impl<F> ReachabilityProbe for F
where
    F: Fn(&str) -> bool,
{
    fn probe(&self, host: &str) -> bool {
        self(host)
    }
}

/// TCP connect probe against `host:port`.
///
/// Every resolved address gets one bounded connect attempt; the host is
/// reachable as soon as one of them succeeds. No data is exchanged.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ReachabilityProbe for TcpProbe {
    fn probe(&self, host: &str) -> bool {
        let addrs = match (host, self.port).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!(host = %host, error = %e, "cannot resolve host");
                return false;
            }
        };

        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return true,
                Err(e) => debug!(host = %host, addr = %addr, error = %e, "connect failed"),
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_probe_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new(port, Duration::from_secs(2));
        assert!(probe.probe("127.0.0.1"));
    }

    #[test]
    fn test_tcp_probe_closed_port() {
        // bind then drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = TcpProbe::new(port, Duration::from_millis(500));
        assert!(!probe.probe("127.0.0.1"));
    }

    #[test]
    fn test_tcp_probe_unresolvable_host() {
        let probe = TcpProbe::new(22, Duration::from_millis(200));
        assert!(!probe.probe("no-such-host.invalid"));
    }

    #[test]
    fn test_closure_probe() {
        let probe = |host: &str| host.starts_with("sdw");
        assert!(probe.probe("sdw1"));
        assert!(!ReachabilityProbe::probe(&probe, "mdw"));
    }
}
