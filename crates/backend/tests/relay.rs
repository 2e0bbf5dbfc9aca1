//! Backend relay against an in-process collector, and against nothing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Router};
use sr_backend::{BackendRelay, ReadingSink};
use sr_domain::config::BackendConfig;

type Received = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn start_collector(status: StatusCode) -> (SocketAddr, Received) {
    let received: Received = Arc::default();

    let app = Router::new()
        .route(
            "/api/sound/capture",
            post(
                move |State(rx): State<Received>, Form(form): Form<HashMap<String, String>>| async move {
                    rx.lock().unwrap().push(form);
                    (status, "stored")
                },
            ),
        )
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, received)
}

fn relay_for(addr: SocketAddr) -> BackendRelay {
    BackendRelay::new(&BackendConfig {
        url: format!("http://{addr}"),
        timeout_ms: 2_000,
    })
    .unwrap()
}

#[tokio::test]
async fn posts_value_as_form_field() {
    let (addr, received) = start_collector(StatusCode::OK).await;

    relay_for(addr).send_reading(42.5).await;

    let got = received.lock().unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].get("value-db").map(String::as_str), Some("42.5"));
}

#[tokio::test]
async fn whole_number_is_posted_with_decimal_point() {
    let (addr, received) = start_collector(StatusCode::OK).await;

    relay_for(addr).send_reading(42.0).await;

    let got = received.lock().unwrap();
    assert_eq!(got[0].get("value-db").map(String::as_str), Some("42.0"));
}

#[tokio::test]
async fn http_error_is_swallowed() {
    let (addr, received) = start_collector(StatusCode::INTERNAL_SERVER_ERROR).await;

    relay_for(addr).send_reading(70.0).await;

    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn connection_refused_is_swallowed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    // Returns normally; nothing to assert beyond not panicking or hanging.
    tokio::time::timeout(Duration::from_secs(5), relay_for(addr).send_reading(12.0))
        .await
        .expect("relay must not hang on a dead backend");
}
