//! Minimal canned-response HTTP stub for exercising the snapshot client
//! without a live cluster. One request per connection, matched on
//! `(method, path)`; anything unmatched answers 404 with an empty object.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread;

pub struct StubRoute {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl StubRoute {
    pub fn new(
        method: &'static str,
        path: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        StubRoute {
            method,
            path: path.into(),
            status,
            body: body.into(),
        }
    }
}

/// Spawns the stub on an ephemeral port and returns its base URL. The accept
/// loop runs on a detached thread for the lifetime of the test process.
pub fn spawn_stub(routes: Vec<StubRoute>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            // Drain headers, honouring content-length so the request body
            // is consumed before we answer.
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            break;
                        }
                        if let Some((name, value)) = trimmed.split_once(':') {
                            if name.eq_ignore_ascii_case("content-length") {
                                content_length = value.trim().parse().unwrap_or(0);
                            }
                        }
                    }
                    Err(_) => break,
                }
            }
            if content_length > 0 {
                let mut body = vec![0u8; content_length];
                let _ = reader.read_exact(&mut body);
            }

            let (status, body) = routes
                .iter()
                .find(|r| r.method == method && r.path == path)
                .map(|r| (r.status, r.body.as_str()))
                .unwrap_or((404, "{}"));

            let response = format!(
                "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = reader.get_mut().write_all(response.as_bytes());
        }
    });

    format!("http://{addr}")
}
