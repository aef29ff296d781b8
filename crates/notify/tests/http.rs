//! HttpNotifier against a throwaway local HTTP listener.

use onair_notify::{HttpNotifier, Notifier, NotifyError, SessionFlag};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

#[derive(Debug)]
struct CapturedRequest {
    method: String,
    path: String,
    content_type: Option<String>,
    body: String,
}

/// Outcome of reading one request; malformed requests carry the reason.
type Captured = Result<CapturedRequest, String>;

/// Accepts connections forever, answering each with `status`.
async fn spawn_server(status: u16) -> (String, mpsc::UnboundedReceiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(handle(stream, status).await);
            });
        }
    });

    (base, rx)
}

async fn next_request(rx: &mut mpsc::UnboundedReceiver<Captured>) -> CapturedRequest {
    match rx.recv().await {
        Some(Ok(request)) => request,
        Some(Err(reason)) => panic!("malformed request: {reason}"),
        None => panic!("server stopped"),
    }
}

async fn handle(mut stream: TcpStream, status: u16) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.map_err(|e| e.to_string())?;
        if n == 0 {
            return Err("connection closed before end of headers".to_string());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let (Some(method), Some(path)) = (request_line.next(), request_line.next()) else {
        return Err(format!("bad request line in {head:?}"));
    };
    let (method, path) = (method.to_string(), path.to_string());

    let mut content_length = 0usize;
    let mut content_type = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => {
                    content_length = value
                        .trim()
                        .parse()
                        .map_err(|e| format!("Content-Length {:?}: {e}", value.trim()))?
                }
                "content-type" => content_type = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.map_err(|e| e.to_string())?;
        if n == 0 {
            return Err(format!(
                "body truncated: {} of {content_length} bytes",
                buf.len() - header_end
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let response = format!(
        "HTTP/1.1 {status} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;

    Ok(CapturedRequest {
        method,
        path,
        content_type,
        body,
    })
}

#[tokio::test]
async fn test_server_rejects_bad_content_length() {
    let (base, mut rx) = spawn_server(200).await;
    let mut stream = TcpStream::connect(base.trim_start_matches("http://"))
        .await
        .unwrap();
    stream
        .write_all(b"POST /json HTTP/1.1\r\nContent-Length: ten\r\n\r\n{\"ps\":3}")
        .await
        .unwrap();

    let reason = rx.recv().await.unwrap().unwrap_err();
    assert!(reason.starts_with("Content-Length \"ten\""), "{reason}");
}

#[tokio::test]
async fn test_server_rejects_truncated_body() {
    let (base, mut rx) = spawn_server(200).await;
    let mut stream = TcpStream::connect(base.trim_start_matches("http://"))
        .await
        .unwrap();
    stream
        .write_all(b"POST /json HTTP/1.1\r\nContent-Length: 40\r\n\r\n{\"ps\":3}")
        .await
        .unwrap();
    stream.shutdown().await.unwrap();

    let reason = rx.recv().await.unwrap().unwrap_err();
    assert_eq!(reason, "body truncated: 8 of 40 bytes");
}

#[tokio::test]
async fn test_status_is_posted_as_json() {
    let (base, mut rx) = spawn_server(200).await;
    let notifier = HttpNotifier::new(format!("{base}/json"), format!("{base}/win")).unwrap();

    notifier.notify_status(3).await.unwrap();

    let request = next_request(&mut rx).await;
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/json");
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, serde_json::json!({"ps": 3}));
}

#[tokio::test]
async fn test_control_flags_are_appended_to_get_url() {
    let (base, mut rx) = spawn_server(200).await;
    let notifier = HttpNotifier::new(format!("{base}/json"), format!("{base}/win")).unwrap();

    notifier.notify_control(SessionFlag::Start).await.unwrap();
    notifier.notify_control(SessionFlag::End).await.unwrap();

    let start = next_request(&mut rx).await;
    assert_eq!(start.method, "GET");
    assert_eq!(start.path, "/win&T=1");

    let end = next_request(&mut rx).await;
    assert_eq!(end.method, "GET");
    assert_eq!(end.path, "/win&T=0");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let (base, _rx) = spawn_server(500).await;
    let notifier = HttpNotifier::new(format!("{base}/json"), format!("{base}/win")).unwrap();

    let err = notifier.notify_status(1).await.unwrap_err();
    assert!(matches!(err, NotifyError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier =
        HttpNotifier::new(format!("http://{addr}/json"), format!("http://{addr}/win")).unwrap();

    let err = notifier.notify_control(SessionFlag::End).await.unwrap_err();
    assert!(matches!(err, NotifyError::Transport { .. }));
}

#[tokio::test]
async fn test_unresponsive_endpoint_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    // Accept and hold connections open without answering.
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let notifier = HttpNotifier::with_timeout(
        format!("{base}/json"),
        format!("{base}/win"),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = notifier.notify_status(2).await.unwrap_err();
    assert!(matches!(err, NotifyError::Timeout { .. }));
}
