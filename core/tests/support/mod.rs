//! In-process stand-in for the generation service.
#![allow(dead_code)]

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use tiny_http::{Header, Response, Server};

pub const PPTX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

#[derive(Clone)]
pub struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    pub fn pptx(bytes: &[u8]) -> Self {
        Self {
            status: 200,
            content_type: PPTX_MEDIA_TYPE,
            body: bytes.to_vec(),
        }
    }

    pub fn previews(urls: &[&str]) -> Self {
        let body = serde_json::json!({ "slide_previews": urls });
        Self::json(200, &body.to_string())
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }
}

pub struct FakeService {
    pub base_url: String,
    generate_hits: Arc<AtomicUsize>,
    preview_hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl FakeService {
    pub fn start(generate: Reply, preview: Reply) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();

        let generate_hits = Arc::new(AtomicUsize::new(0));
        let preview_hits = Arc::new(AtomicUsize::new(0));
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let gen_count = generate_hits.clone();
        let prev_count = preview_hits.clone();
        let seen = bodies.clone();
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut raw = String::new();
                let _ = request.as_reader().read_to_string(&mut raw);
                if let Ok(value) = serde_json::from_str(&raw) {
                    seen.lock().unwrap().push(value);
                }

                let reply = match request.url() {
                    "/api/generate_presentation" => {
                        gen_count.fetch_add(1, Ordering::SeqCst);
                        generate.clone()
                    }
                    "/api/preview_slides" => {
                        prev_count.fetch_add(1, Ordering::SeqCst);
                        preview.clone()
                    }
                    _ => Reply::json(404, r#"{"detail":"Not Found"}"#),
                };

                let header =
                    Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
                        .unwrap();
                let response = Response::from_data(reply.body)
                    .with_status_code(reply.status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url: format!("http://{addr}/"),
            generate_hits,
            preview_hits,
            bodies,
        }
    }

    pub fn generate_hits(&self) -> usize {
        self.generate_hits.load(Ordering::SeqCst)
    }

    pub fn preview_hits(&self) -> usize {
        self.preview_hits.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.bodies.lock().unwrap().clone()
    }
}
