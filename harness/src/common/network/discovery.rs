//! # Port Discovery
//!
//! File: harness/src/common/network/discovery.rs
//! Author: Christi Mahu
//!
use std::net::TcpListener;
use tracing::debug;

/// Returns a loopback TCP port that was free a moment ago.
///
/// The port is bound and released immediately, so another process may take
/// it before the caller does. That race is accepted for test use.
///
/// # Panics
///
/// Panics if no ephemeral port can be bound.
pub fn get_free_port() -> u16 {
    let listener = match TcpListener::bind(("127.0.0.1", 0)) {
        Ok(listener) => listener,
        Err(e) => panic!("failed to bind an ephemeral port: {e}"),
    };
    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(e) => panic!("failed to read the bound address: {e}"),
    };
    debug!(port, "Picked free port");
    port
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_port_is_bindable() {
        let port = get_free_port();
        assert_ne!(port, 0);
        // Released on return, so it can be bound again right away.
        TcpListener::bind(("127.0.0.1", port)).expect("port should be free");
    }
}
