use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

use examdash_engine::{
    ChannelEnd, ChannelError, ClientSettings, JobNotifier, Sentinel, WebSocketNotifier, ACK_TOKEN,
};

/// Accepts one websocket connection, sends `frames`, and reports the
/// request path plus the first text frame the client sends back.
async fn serve_once(
    frames: Vec<&'static str>,
) -> (String, oneshot::Receiver<(String, Option<String>)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut request_path = String::new();
        let record_path = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            request_path = req.uri().path().to_string();
            Ok(resp)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, record_path)
            .await
            .unwrap();

        for frame in frames {
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }

        let mut reply = None;
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                reply = Some(text);
                break;
            }
        }
        let _ = tx.send((request_path, reply));
    });

    (base_url, rx)
}

fn notifier(base_url: String) -> WebSocketNotifier {
    WebSocketNotifier::new(&ClientSettings {
        base_url,
        ..ClientSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn done_sentinel_is_acknowledged() {
    dash_logging::initialize_for_tests();
    let (base_url, server) = serve_once(vec!["working", "done"]).await;

    let end = notifier(base_url).wait_for_completion("job-7").await.unwrap();
    assert_eq!(end, ChannelEnd::Signalled(Sentinel::Done));

    let (request_path, reply) = server.await.unwrap();
    assert_eq!(request_path, "/ws/job-7");
    assert_eq!(reply.as_deref(), Some(ACK_TOKEN));
}

#[tokio::test]
async fn error_sentinel_also_ends_the_channel() {
    let (base_url, _server) = serve_once(vec!["error"]).await;

    let end = notifier(base_url).wait_for_completion("job-8").await.unwrap();
    assert_eq!(end, ChannelEnd::Signalled(Sentinel::Error));
}

#[tokio::test]
async fn close_without_sentinel_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let _ = ws.close(None).await;
    });

    let end = notifier(base_url).wait_for_completion("job-9").await.unwrap();
    assert_eq!(end, ChannelEnd::ClosedByServer);
}

#[tokio::test]
async fn unreachable_server_is_a_connect_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = notifier(base_url).wait_for_completion("job-1").await.unwrap_err();
    assert!(matches!(err, ChannelError::Connect(_)));
}
