//! In-process stand-in for the media server, used by the tests.

use std::net::SocketAddr;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::mpsc};

#[derive(Debug)]
pub struct ReceivedRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    sender: mpsc::UnboundedSender<ReceivedRequest>,
}

pub struct StubServer {
    addr: SocketAddr,
    requests: mpsc::UnboundedReceiver<ReceivedRequest>,
}

async fn handle(
    State(state): State<StubState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let _ = state.sender.send(ReceivedRequest { headers, body });
    (state.status, state.body)
}

impl StubServer {
    /// Answers every `POST /` with `status` and `body`.
    pub async fn start(status: u16, body: &'static str) -> Self {
        let (sender, requests) = mpsc::unbounded_channel();
        let state = StubState {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            sender,
        };
        let app = Router::new().route("/", post(handle)).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn host(&self) -> String {
        format!("http://{}", self.addr.ip())
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Requests seen so far, in arrival order.
    pub fn received(&mut self) -> Vec<ReceivedRequest> {
        let mut requests = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            requests.push(request);
        }
        requests
    }
}

/// A local port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
