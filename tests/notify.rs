//! The HTTP notifier against real servers on loopback

use std::net::SocketAddr;

use axum::{extract::State, response::Json, routing::post, Router};
use crossbeam_channel::Sender;
use serde_json::{json, Value};

use web_play_rec::notify::{ButtonPressed, HttpNotifier, Notifier};

/// Serve `app` on an ephemeral port from a dedicated runtime thread
fn spawn_server(app: Router) -> SocketAddr {
    let (addr_send, addr_recv) = crossbeam_channel::bounded(1);

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            addr_send.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    addr_recv.recv().unwrap()
}

async fn forward(State(sender): State<Sender<Value>>, Json(body): Json<Value>) -> Json<Value> {
    sender.send(body).unwrap();
    Json(json!({ "success": true }))
}

#[test]
fn test_posts_each_press_in_order() {
    let (body_send, body_recv) = crossbeam_channel::unbounded();
    let app = Router::new()
        .route("/buttonPressed", post(forward))
        .with_state(body_send);
    let addr = spawn_server(app);

    let notifier = HttpNotifier::new(format!("http://{}", addr));
    notifier.notify(ButtonPressed {
        pan: 0.,
        volume: 1.,
    });
    notifier.notify(ButtonPressed {
        pan: -1.,
        volume: 0.5,
    });

    // dropping waits for the queued requests
    drop(notifier);

    let bodies: Vec<Value> = body_recv.try_iter().collect();
    assert_eq!(
        bodies,
        vec![
            json!({"pan": 0.0, "volume": 1.0}),
            json!({"pan": -1.0, "volume": 0.5}),
        ]
    );
}

#[test]
fn test_server_failure_is_not_fatal() {
    // every request is answered with 404
    let addr = spawn_server(Router::new());

    let notifier = HttpNotifier::new(format!("http://{}", addr));
    notifier.notify(ButtonPressed {
        pan: 0.,
        volume: 1.,
    });
    drop(notifier);
}

#[test]
fn test_endpoint_server_round_trip() {
    let addr = spawn_server(web_play_rec::server::router());

    let response: Value = reqwest::blocking::Client::new()
        .post(format!("http://{}/buttonPressed", addr))
        .json(&ButtonPressed {
            pan: 0.5,
            volume: 2.,
        })
        .send()
        .unwrap()
        .json()
        .unwrap();

    assert_eq!(response, json!({"success": true}));
}
