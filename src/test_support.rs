//! Fixtures shared by the unit tests: PDF files on disk and a fake upload server.

use crate::upload::UploadItem;
use parking_lot::Mutex;
use reqwest::Url;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

pub fn write_pdf(dir: &Path, name: &str, size: usize) -> UploadItem {
    let path = dir.join(name);
    let mut content = b"%PDF-1.4\n".to_vec();
    content.resize(size.max(content.len()), b'x');
    std::fs::write(&path, &content).expect("write pdf fixture");
    UploadItem {
        path,
        name: name.to_string(),
        size: content.len() as u64,
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Answers every request with a fixed status and body and records what it received.
pub struct FakeServer {
    server: Arc<Server>,
    origin: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeServer {
    pub fn start(status: u16, body: &'static str) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO)
    }

    pub fn start_with_delay(status: u16, body: &'static str, delay: Duration) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind fake server"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("fake server listens on tcp");
        let origin = Url::parse(&format!("http://{}", addr)).expect("origin url");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let worker = Arc::clone(&server);
        let recorded = Arc::clone(&requests);
        std::thread::spawn(move || {
            for mut request in worker.incoming_requests() {
                let mut content = Vec::new();
                let _ = request.as_reader().read_to_end(&mut content);
                let content_type = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Content-Type"))
                    .map(|header| header.value.as_str().to_string());
                recorded.lock().push(RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    content_type,
                    body: content,
                });

                std::thread::sleep(delay);
                let json = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .expect("static header");
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(json);
                let _ = request.respond(response);
            }
        });

        Self {
            server,
            origin,
            requests,
        }
    }

    /// An origin nothing is listening on.
    pub fn closed_origin() -> Url {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
        let addr = listener.local_addr().expect("probe addr");
        drop(listener);
        Url::parse(&format!("http://{}", addr)).expect("origin url")
    }

    pub fn origin(&self) -> Url {
        self.origin.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}
