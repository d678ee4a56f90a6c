//! One-shot HTTP responder for adapter tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// The request the responder received.
#[derive(Debug)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    recorded: Arc<Mutex<Option<oneshot::Sender<Recorded>>>>,
}

async fn respond(
    State(canned): State<Canned>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let sender = canned.recorded.lock().unwrap().take();
    if let Some(sender) = sender {
        let _ = sender.send(Recorded {
            method: method.to_string(),
            target: uri.to_string(),
            headers,
            body,
        });
    }
    (
        canned.status,
        [(header::CONTENT_TYPE, "application/json")],
        canned.body,
    )
        .into_response()
}

/// HTTP client that never goes through a proxy.
pub fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Answers every request with `status` and a JSON `body`, recording the
/// first one.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<Recorded>) {
    let (tx, rx) = oneshot::channel();
    let canned = Canned {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        recorded: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new().fallback(respond).with_state(canned);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let recorded = tokio::spawn(async move { rx.await.unwrap() });
    (format!("http://{addr}"), recorded)
}
