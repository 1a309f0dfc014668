//! Exercises the socket transport against a loopback HTTP peer.

use mailcast_client::{
    BroadcastDraft, Endpoint, Method, Request, SocketTransport, SubmissionError, SubmissionResult,
    SubmissionService, Transport, image_attachment,
};
use mailcast_multipart::{Form, decode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

struct Captured {
    head: String,
    body: Vec<u8>,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.head.split("\r\n").skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// Accepts one connection, captures the request and replies with `response`.
async fn serve_once(response: &'static [u8]) -> (String, JoinHandle<Captured>) {
    serve_once_on(TcpListener::bind("127.0.0.1:0").await.unwrap(), response)
}

fn serve_once_on(listener: TcpListener, response: &'static [u8]) -> (String, JoinHandle<Captured>) {
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        let head_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
        };
        let head = String::from_utf8(raw[..head_end].to_vec()).unwrap();
        let mut captured = Captured {
            head,
            body: raw[head_end + 4..].to_vec(),
        };

        let expected: usize = captured
            .header("content-length")
            .map(|v| v.parse().unwrap())
            .unwrap_or(0);
        while captured.body.len() < expected {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before sending the body");
            captured.body.extend_from_slice(&buf[..n]);
        }

        socket.write_all(response).await.unwrap();
        socket.shutdown().await.unwrap();
        captured
    });

    (base, handle)
}

#[tokio::test]
async fn create_with_image_round_trips_through_socket() {
    let (base, server) = serve_once(
        b"HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: 119\r\n\r\n\
{\"id\":42,\"status\":\"draft\",\"url\":\"https://x/42\",\"created_at\":\"2026-01-01T00:00:00Z\",\"updated_at\":\"2026-01-01T00:00:00Z\"}",
    )
    .await;

    let service = SubmissionService::new(SocketTransport::new(), Endpoint::new(&base, "secret"));
    let draft = BroadcastDraft::new("Hi", "Body");
    let images = [image_attachment("pic.png", vec![0x89u8, 0x50, 0x4e])];

    let result = service.create(&draft, &images).await.unwrap();
    assert_eq!(
        result,
        SubmissionResult {
            id:         Some(42),
            status:     "draft".into(),
            url:        Some("https://x/42".into()),
            created_at: Some("2026-01-01T00:00:00Z".into()),
            updated_at: Some("2026-01-01T00:00:00Z".into()),
        }
    );

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /broadcast_mails HTTP/1.1\r\n"));
    assert_eq!(captured.header("authorization"), Some("Bearer secret"));

    let content_type = captured.header("content-type").unwrap();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .expect("multipart content type");

    let parts = decode(boundary, &captured.body).unwrap();
    assert_eq!(parts.len(), 3);
    assert_eq!((parts[0].name.as_str(), parts[0].text()), ("subject", Some("Hi")));
    assert_eq!((parts[1].name.as_str(), parts[1].text()), ("content", Some("Body")));
    assert_eq!(parts[2].name, "images[]");
    assert_eq!(parts[2].filename.as_deref(), Some("pic.png"));
    assert_eq!(parts[2].data.as_ref(), &[0x89u8, 0x50, 0x4e]);
}

#[tokio::test]
async fn unauthorized_update() {
    let (base, server) =
        serve_once(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 24\r\n\r\n{\"error\":\"Unauthorized\"}").await;

    let service = SubmissionService::new(SocketTransport::new(), Endpoint::new(&base, "bad"));
    let err = service
        .update(9, &BroadcastDraft::new("s", "c"), &[])
        .await
        .unwrap_err();

    assert_eq!(err, SubmissionError::Unauthorized);
    assert!(server.await.unwrap().head.starts_with("PATCH /broadcast_mails/9 HTTP/1.1"));
}

#[tokio::test]
async fn html_error_page_on_write_is_still_classified() {
    let (base, _server) =
        serve_once(b"HTTP/1.1 502 Bad Gateway\r\nContent-Type: text/html\r\n\r\n<html>bad gateway</html>").await;

    let body = Form::new().text("subject", "s").encode();
    let response = SocketTransport::new()
        .send(Request::write(Method::Post, format!("{base}/broadcast_mails"), "t", body))
        .await
        .unwrap();

    assert_eq!(response.status, 502);
    assert_eq!(response.body, None);
}

#[tokio::test]
async fn html_body_on_read_is_a_transport_error() {
    let (base, server) = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 6\r\n\r\n<html>").await;

    let err = SocketTransport::new()
        .send(Request::read(format!("{base}/tenant_emails"), "t"))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Transport(_)));

    let captured = server.await.unwrap();
    assert_eq!(captured.header("accept"), Some("application/json"));
    assert!(captured.body.is_empty());
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = SocketTransport::new()
        .send(Request::read(format!("http://{addr}/tenant_emails"), "t"))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Transport(_)));
}

#[tokio::test]
async fn ipv6_literal_base_url() {
    // hosts without an IPv6 loopback have nothing to test
    let Ok(listener) = TcpListener::bind("[::1]:0").await else {
        return;
    };
    let (base, server) = serve_once_on(listener, b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n[]");
    assert!(base.starts_with("http://[::1]:"));

    let response = SocketTransport::new()
        .send(Request::read(format!("{base}/tenant_emails"), "t"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let captured = server.await.unwrap();
    let port = base.rsplit(':').next().unwrap();
    assert_eq!(captured.header("host"), Some(format!("[::1]:{port}").as_str()));
}
