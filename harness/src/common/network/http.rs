//! # HTTP Get-and-Assert
//!
//! File: harness/src/common/network/http.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `http_get_and_assert` polls a URL until a request completes, then checks
//! the status code of that first response. Requests that fail outright
//! (connection refused, reset, timed out) are retried; a response with the
//! wrong status is not.
//!
//! The client talks to published container ports on the local host, so it
//! ignores proxy settings from the environment.
//!
use crate::common::wait;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// GETs `url` up to `max_retry` times and asserts the status code is `want`.
///
/// # Arguments
///
/// * `url` - Absolute URL, e.g. `http://localhost:8080/v2/`.
/// * `want` - Expected HTTP status code.
/// * `max_retry` - Number of request attempts.
/// * `retry_interval` - Sleep between failed attempts.
///
/// # Panics
///
/// Panics when no request completes (with the last error) or when the
/// status code differs from `want`.
pub fn http_get_and_assert(url: &str, want: u16, max_retry: usize, retry_interval: Duration) {
    let client = match Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .no_proxy()
        .build()
    {
        Ok(client) => client,
        Err(e) => panic!("failed to build http client: {e}"),
    };

    let response = wait::retry(max_retry, retry_interval, |attempt| {
        client.get(url).send().inspect_err(|e| {
            debug!(url, attempt, "GET failed: {}", e);
        })
    });
    let status = match response {
        // Dropping the response closes the body.
        Ok(response) => response.status().as_u16(),
        Err(exhausted) => panic!(
            "GET {url} did not succeed after {} attempts: {}",
            exhausted.attempts,
            exhausted
                .last_error
                .map_or_else(|| "no attempt was made".to_string(), |e| e.to_string())
        ),
    };
    assert_eq!(status, want, "unexpected status code from GET {url}");
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::network::get_free_port;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answers a single request with `status` and an empty body.
    fn respond_once(status_line: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v2/", listener.local_addr().unwrap());
        let server = thread::spawn(move || {
            let Ok((mut conn, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match conn.read(&mut chunk) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            );
            let _ = conn.write_all(response.as_bytes());
        });
        (url, server)
    }

    #[test]
    fn test_matching_status() {
        let (url, server) = respond_once("200 OK");
        http_get_and_assert(&url, 200, 3, Duration::from_millis(10));
        server.join().unwrap();
    }

    #[test]
    #[should_panic(expected = "unexpected status code")]
    fn test_mismatched_status() {
        let (url, _server) = respond_once("404 Not Found");
        http_get_and_assert(&url, 200, 3, Duration::from_millis(10));
    }

    #[test]
    #[should_panic(expected = "did not succeed after 2 attempts")]
    fn test_no_server() {
        let url = format!("http://127.0.0.1:{}/", get_free_port());
        http_get_and_assert(&url, 200, 2, Duration::from_millis(1));
    }
}
