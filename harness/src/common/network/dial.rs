//! # Socket Dial-and-Read
//!
//! File: harness/src/common/network/dial.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `dial_and_read` waits for something to listen at an address and then
//! checks the first bytes it sends. Only the connect step is retried; once a
//! connection is made, a short read or a content mismatch fails the test
//! straight away.
//!
//! Supported networks are `tcp` (any `host:port`) and, on unix, `unix` (a
//! socket path).
//!
use crate::common::wait;
use std::io::{self, Read};
use std::net::TcpStream;
use std::time::Duration;
use tracing::debug;

/// Upper bound on a single read once connected.
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Connects to `address` over `network`, retrying the connection up to
/// `max_retry` times, then asserts the first `want.len()` bytes equal `want`.
///
/// # Arguments
///
/// * `network` - `"tcp"` or `"unix"`.
/// * `address` - `host:port` for tcp, a socket path for unix.
/// * `want` - The exact bytes expected at the start of the stream.
/// * `max_retry` - Number of connection attempts.
/// * `retry_interval` - Sleep between failed attempts.
///
/// # Panics
///
/// Panics on an unknown network, when no attempt connects (with the last
/// connection error), when the read fails, or when the content differs.
pub fn dial_and_read(
    network: &str,
    address: &str,
    want: &str,
    max_retry: usize,
    retry_interval: Duration,
) {
    if !matches!(network, "tcp" | "unix") {
        panic!("unsupported network {network:?}, expected \"tcp\" or \"unix\"");
    }

    let connected = wait::retry(max_retry, retry_interval, |attempt| {
        connect(network, address).inspect_err(|e| {
            debug!(network, address, attempt, "Dial failed: {}", e);
        })
    });
    let mut stream = match connected {
        Ok(stream) => stream,
        Err(exhausted) => panic!(
            "failed to dial {network} {address} after {} attempts: {}",
            exhausted.attempts,
            exhausted
                .last_error
                .map_or_else(|| "no attempt was made".to_string(), |e| e.to_string())
        ),
    };

    let mut got = vec![0u8; want.len()];
    if let Err(e) = stream.read_exact(&mut got) {
        panic!("failed to read {} bytes from {network} {address}: {e}", want.len());
    }
    assert!(
        got.as_slice() == want.as_bytes(),
        "unexpected content from {network} {address}: got {:?}, want {want:?}",
        String::from_utf8_lossy(&got)
    );
}

fn connect(network: &str, address: &str) -> io::Result<Box<dyn Read>> {
    match network {
        "tcp" => {
            let stream = TcpStream::connect(address)?;
            stream.set_read_timeout(Some(READ_TIMEOUT))?;
            Ok(Box::new(stream))
        }
        #[cfg(unix)]
        "unix" => {
            let stream = std::os::unix::net::UnixStream::connect(address)?;
            stream.set_read_timeout(Some(READ_TIMEOUT))?;
            Ok(Box::new(stream))
        }
        _ => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("network {network} is not available on this platform"),
        )),
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::network::get_free_port;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(listener: TcpListener, payload: &'static [u8]) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            if let Ok((mut conn, _)) = listener.accept() {
                let _ = conn.write_all(payload);
            }
        })
    }

    #[test]
    fn test_reads_expected_greeting() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let server = serve_once(listener, b"hello world");
        dial_and_read("tcp", &address, "hello", 3, Duration::from_millis(10));
        server.join().unwrap();
    }

    #[test]
    fn test_waits_for_late_listener() {
        let port = get_free_port();
        let address = format!("127.0.0.1:{port}");
        let server = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
            if let Ok((mut conn, _)) = listener.accept() {
                let _ = conn.write_all(b"ready");
            }
        });
        dial_and_read("tcp", &address, "ready", 100, Duration::from_millis(20));
        server.join().unwrap();
    }

    #[test]
    #[should_panic(expected = "after 3 attempts")]
    fn test_fails_without_listener() {
        let address = format!("127.0.0.1:{}", get_free_port());
        dial_and_read("tcp", &address, "hello", 3, Duration::from_millis(1));
    }

    #[test]
    #[should_panic(expected = "unexpected content")]
    fn test_fails_on_mismatch() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let _server = serve_once(listener, b"goodbye");
        dial_and_read("tcp", &address, "hello", 3, Duration::from_millis(10));
    }

    #[test]
    #[should_panic(expected = "unexpected content")]
    fn test_compares_raw_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap().to_string();
        // A truncated 4-byte sequence decodes lossily to a single U+FFFD.
        let _server = serve_once(listener, b"\xF0\x9F\x98");
        dial_and_read("tcp", &address, "\u{FFFD}", 3, Duration::from_millis(10));
    }

    #[test]
    #[should_panic(expected = "unsupported network")]
    fn test_rejects_unknown_network() {
        dial_and_read("udp", "127.0.0.1:1", "x", 1, Duration::ZERO);
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_from_unix_socket() {
        use std::os::unix::net::UnixListener;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greeting.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let server = thread::spawn(move || {
            if let Ok((mut conn, _)) = listener.accept() {
                let _ = conn.write_all(b"unix hello");
            }
        });
        dial_and_read(
            "unix",
            path.to_str().unwrap(),
            "unix hello",
            3,
            Duration::from_millis(10),
        );
        server.join().unwrap();
    }
}
