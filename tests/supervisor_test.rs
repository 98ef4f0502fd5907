//! Integration tests for the reconnect supervisor's cancellation behavior.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};

use chzzk_chat_viewer::client::run_supervisor_with_resolver;
use chzzk_chat_viewer::resolver::ChannelResolver;

#[tokio::test]
async fn test_stop_during_pending_resolve_returns_promptly() {
    // given: a live-status server that accepts the connection but never
    // answers, leaving the resolve request pending
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(socket);
    });

    let (update_tx, _update_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let resolver = ChannelResolver::with_base_url(base_url);

    // when: stop is raised while resolution is in flight
    let supervisor = tokio::spawn(run_supervisor_with_resolver(
        resolver,
        "abc123".to_string(),
        update_tx,
        stop_rx,
    ));
    tokio::time::sleep(Duration::from_millis(200)).await;
    stop_tx.send(true).unwrap();

    // then: the supervisor stops without waiting out the stalled request
    tokio::time::timeout(Duration::from_secs(2), supervisor)
        .await
        .expect("supervisor did not observe the stop signal in time")
        .unwrap();
}
