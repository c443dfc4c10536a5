use scimine::Record;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use time::macros::datetime;
use time::OffsetDateTime;

/// Spawn a tiny single-threaded HTTP stub serving the given JSON bodies in
/// order (the last body repeats). Returns the base URL and a request counter.
/// Every response closes the connection, so one request equals one hit.
pub fn spawn_json_stub(bodies: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let served = hits.clone();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let n = served.fetch_add(1, Ordering::SeqCst);
            read_request(&mut stream);
            let body = bodies
                .get(n.min(bodies.len().saturating_sub(1)))
                .cloned()
                .unwrap_or_else(|| "{}".to_string());
            let resp = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(resp.as_bytes());
        }
    });

    (format!("http://{}", addr), hits)
}

/// Consume one HTTP request: headers, then any Content-Length body.
fn read_request(stream: &mut std::net::TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let header_end = loop {
        match stream.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => data.extend_from_slice(&buf[..n]),
            Err(_) => return,
        }
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        if data.len() > 64 * 1024 {
            return;
        }
    };

    let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);
    let mut remaining = content_length.saturating_sub(data.len() - header_end);
    while remaining > 0 {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => remaining = remaining.saturating_sub(n),
        }
    }
}

pub fn sample_record(item_id: &str, title: &str, abstract_text: &str, cites: i64) -> Record {
    Record {
        author_id: "42".to_string(),
        item_id: item_id.to_string(),
        title: title.to_string(),
        abstract_text: abstract_text.to_string(),
        views: 100,
        answers: 3,
        cites,
        tags: vec!["rust".to_string(), "nlp".to_string()],
        created: Some(sample_date()),
        last_activity: Some(sample_date()),
        ..Default::default()
    }
}

pub fn sample_date() -> OffsetDateTime {
    datetime!(2022-06-15 12:30 UTC)
}
