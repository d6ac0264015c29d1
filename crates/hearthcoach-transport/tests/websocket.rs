//! Integration tests for the WebSocket client transport.
//!
//! These tests spin up a real WebSocket server (plain `tokio-tungstenite`
//! on an OS-assigned port) and drive it with [`WebSocketConnector`] to
//! verify that text actually flows over the network.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use hearthcoach_transport::{
        Connection, Connector, TransportError, WebSocketConnector,
    };
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on a random port and returns it with its `ws://` URL.
    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have local addr");
        (listener, format!("ws://{addr}"))
    }

    async fn accept(listener: TcpListener) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_websocket_connect_send_receive() {
        let (listener, url) = bind().await;
        let server = tokio::spawn(accept(listener));

        let conn = WebSocketConnector::new()
            .connect(&url)
            .await
            .expect("should connect");
        let mut server_ws = server.await.expect("task should complete");

        assert!(conn.id().into_inner() > 0);

        // --- Client sends, server receives ---
        conn.send(r#"{"type":"reset"}"#)
            .await
            .expect("send should succeed");
        let msg = server_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.to_text().unwrap(), r#"{"type":"reset"}"#);

        // --- Server sends, client receives ---
        server_ws
            .send(Message::text(r#"{"type":"status","connected":true}"#))
            .await
            .unwrap();
        let received = conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, r#"{"type":"status","connected":true}"#);

        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_binary_utf8_frames_are_accepted_as_text() {
        let (listener, url) = bind().await;
        let server = tokio::spawn(accept(listener));

        let conn = WebSocketConnector::new().connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws
            .send(Message::Binary(b"{\"type\":\"x\"}".to_vec().into()))
            .await
            .unwrap();

        let received = conn.recv().await.unwrap().unwrap();
        assert_eq!(received, "{\"type\":\"x\"}");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_server_close() {
        let (listener, url) = bind().await;
        let server = tokio::spawn(accept(listener));

        let conn = WebSocketConnector::new().connect(&url).await.unwrap();
        let mut server_ws = server.await.unwrap();

        server_ws.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on server close");
    }

    #[tokio::test]
    async fn test_websocket_connect_refused_is_connect_failed() {
        // Bind then drop so the port is (almost certainly) closed.
        let (listener, url) = bind().await;
        drop(listener);

        let result = WebSocketConnector::new().connect(&url).await;
        assert!(
            matches!(result, Err(TransportError::ConnectFailed(_))),
            "expected ConnectFailed"
        );
    }
}
