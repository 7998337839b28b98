//! Hand-written HTTP/1.1 file hosts for failure modes wiremock cannot produce:
//! a body cut short and a body that never ends.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

const CHUNK: [u8; 16 * 1024] = [b'x'; 16 * 1024];

async fn read_request_head(stream: &mut TcpStream) {
    let mut buf = [0u8; 8192];
    let mut seen = Vec::new();
    while !seen.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => seen.extend_from_slice(&buf[..n]),
        }
    }
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/dl/blob.bin", listener.local_addr().unwrap());
    (listener, url)
}

/// Serves one response that promises `declared_len` bytes, sends `sent`
/// bytes, then closes the connection. Returns the file URL.
pub async fn start_truncated(declared_len: usize, sent: usize) -> String {
    let (listener, url) = bind().await;
    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        read_request_head(&mut stream).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: {declared_len}\r\n\r\n"
        );
        let _ = stream.write_all(head.as_bytes()).await;
        let _ = stream.write_all(&vec![b'x'; sent]).await;
        let _ = stream.flush().await;
    });
    url
}

/// Serves one response that streams until the reader goes away. The receiver
/// fires once a write fails, i.e. once the proxy has dropped the connection.
pub async fn start_endless() -> (String, oneshot::Receiver<()>) {
    let (listener, url) = bind().await;
    let (closed_tx, closed_rx) = oneshot::channel();
    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        read_request_head(&mut stream).await;
        let head = "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: 1099511627776\r\n\r\n";
        if stream.write_all(head.as_bytes()).await.is_err() {
            let _ = closed_tx.send(());
            return;
        }
        loop {
            if stream.write_all(&CHUNK).await.is_err() {
                let _ = closed_tx.send(());
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    });
    (url, closed_rx)
}
