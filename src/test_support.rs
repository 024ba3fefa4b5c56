//! Local HTTP server serving canned responses for resolver tests.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hyper::body::Bytes;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    body: Vec<u8>,
    content_type: Option<&'static str>,
    delay: Option<Duration>,
    /// Send the body as a chunked stream with no Content-Length.
    chunked: bool,
}

impl MockResponse {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self {
            status,
            body: value.to_string().into_bytes(),
            content_type: Some("application/json"),
            delay: None,
            chunked: false,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
            content_type: Some("text/plain"),
            delay: None,
            chunked: false,
        }
    }

    pub fn bytes(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            content_type: Some("video/mp4"),
            delay: None,
            chunked: false,
        }
    }

    pub fn status(status: u16) -> Self {
        Self::text(status, "")
    }

    pub fn chunked(mut self) -> Self {
        self.chunked = true;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Default)]
struct ServerState {
    routes: Mutex<HashMap<String, Vec<MockResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl MockServer {
    /// Each route answers with its responses in order, repeating the last one.
    /// Unknown paths get a 404.
    pub async fn start(routes: Vec<(String, Vec<MockResponse>)>) -> Self {
        let state = Arc::new(ServerState {
            routes: Mutex::new(routes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        });

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("test listener address");

        let service_state = Arc::clone(&state);
        let make_svc = make_service_fn(move |_conn| {
            let state = Arc::clone(&service_state);
            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle_request(req, Arc::clone(&state))))
            }
        });

        let server = Server::from_tcp(listener)
            .expect("hyper accepts std listener")
            .serve(make_svc);

        tokio::spawn(async move {
            if let Err(e) = server.await {
                eprintln!("mock server error: {}", e);
            }
        });

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

async fn handle_request(req: Request<Body>, state: Arc<ServerState>) -> Result<Response<Body>, Infallible> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let body = hyper::body::to_bytes(req.into_body()).await.unwrap_or_default();

    state.requests.lock().expect("requests lock").push(RecordedRequest {
        method,
        path: path.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let planned = {
        let mut routes = state.routes.lock().expect("routes lock");
        match routes.get_mut(&path) {
            Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
            Some(queue) => queue.first().cloned(),
            None => None,
        }
    };

    let planned = match planned {
        Some(planned) => planned,
        None => {
            let mut not_found = Response::new(Body::from("not found"));
            *not_found.status_mut() = StatusCode::NOT_FOUND;
            return Ok(not_found);
        }
    };

    if let Some(delay) = planned.delay {
        tokio::time::sleep(delay).await;
    }

    let body = if planned.chunked {
        let chunks: Vec<Result<Bytes, std::io::Error>> = planned
            .body
            .chunks(1024)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Body::wrap_stream(futures_util::stream::iter(chunks))
    } else {
        Body::from(planned.body)
    };

    let mut builder = Response::builder().status(planned.status);
    if let Some(content_type) = planned.content_type {
        builder = builder.header("content-type", content_type);
    }
    Ok(builder.body(body).expect("valid mock response"))
}

/// Defaults pointed at nothing, with system proxies disabled so that local
/// servers are reached directly.
pub fn test_config() -> AppConfig {
    AppConfig {
        providers: Vec::new(),
        use_system_proxy: false,
        provider_timeout_secs: 2,
        connect_timeout_secs: 2,
        ..AppConfig::default()
    }
}

pub fn config_for(server: &MockServer, provider_paths: &[&str]) -> AppConfig {
    AppConfig {
        providers: provider_paths.iter().map(|p| server.url(p)).collect(),
        social_api_base: server.url("/fx"),
        ..test_config()
    }
}
