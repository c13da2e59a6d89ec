use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use warp::Filter;

/// Bodies received by the mock server, in arrival order.
pub type Received = Arc<Mutex<Vec<Value>>>;

/// Serve `POST /api/tts`, answering every request with `status` and `body`.
#[allow(dead_code)]
pub async fn spawn_mock_tts(status: u16, body: &'static [u8]) -> (String, mpsc::Sender<()>, Received) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let received: Received = Arc::default();
    let seen = Arc::clone(&received);
    let route = warp::post()
        .and(warp::path("api").and(warp::path("tts")))
        .and(warp::body::json())
        .map(move |payload: Value| {
            seen.lock().unwrap().push(payload);
            warp::http::Response::builder()
                .status(status)
                .body(body.to_vec())
                .unwrap()
        });

    let (addr, server) = warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
        shutdown_rx.recv().await;
    });
    tokio::spawn(server);
    (format!("http://{}", addr), shutdown_tx, received)
}

/// Serve `POST /api/tts`, replying with audio only after `delay`.
#[allow(dead_code)]
pub async fn spawn_slow_tts(delay: Duration) -> (String, mpsc::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let route = warp::post()
        .and(warp::path("api").and(warp::path("tts")))
        .and_then(move || async move {
            tokio::time::sleep(delay).await;
            Ok::<_, warp::Rejection>(warp::http::Response::new(b"late".to_vec()))
        });

    let (addr, server) = warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
        shutdown_rx.recv().await;
    });
    tokio::spawn(server);
    (format!("http://{}", addr), shutdown_tx)
}

/// Serve `POST /api/tts`, sending status and headers at once but holding the
/// body back for `delay`.
#[allow(dead_code)]
pub async fn spawn_stalled_body_tts(delay: Duration) -> (String, mpsc::Sender<()>) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
    let route = warp::post()
        .and(warp::path("api").and(warp::path("tts")))
        .map(move || {
            let (mut sender, body) = warp::hyper::Body::channel();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = sender.send_data("late".into()).await;
            });
            warp::http::Response::new(body)
        });

    let (addr, server) = warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
        shutdown_rx.recv().await;
    });
    tokio::spawn(server);
    (format!("http://{}", addr), shutdown_tx)
}
