#![allow(dead_code)]

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A parsed request as seen by the test server.
#[derive(Debug, Clone)]
pub struct TestRequest {
    pub path: String,
    pub head: String,
}

impl TestRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then(|| v.trim().to_string())
        })
    }
}

#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            reason: "OK",
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Self {
            status,
            reason: "Found",
            headers: vec![("Location".to_string(), location.to_string())],
            body: Vec::new(),
        }
    }

    pub fn status(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// Serve `handler` on an ephemeral local port until the test runtime shuts down.
///
/// Returns the base URL (`http://127.0.0.1:<port>`). Every response closes its connection.
pub async fn serve<F>(handler: F) -> String
where
    F: Fn(&TestRequest) -> TestResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test http listener");
    let addr = listener.local_addr().expect("listener addr");
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                // Read until end of headers; GET requests carry no body.
                let mut buf = [0u8; 1024];
                let mut request = Vec::new();
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") || request.len() > 16 * 1024 {
                                break;
                            }
                        }
                        Err(_) => return,
                    }
                }

                let head = String::from_utf8_lossy(&request).to_string();
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let response = handler(&TestRequest { path, head });

                let mut out = format!("HTTP/1.1 {} {}\r\n", response.status, response.reason);
                for (k, v) in &response.headers {
                    out.push_str(&format!("{k}: {v}\r\n"));
                }
                out.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    response.body.len()
                ));
                let _ = socket.write_all(out.as_bytes()).await;
                let _ = socket.write_all(&response.body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// Handler for `/hop/<n>`: redirects (relative) down to `/hop/0`, which returns `body`.
pub fn hop_handler(body: &'static str) -> impl Fn(&TestRequest) -> TestResponse + Send + Sync + 'static {
    move |req: &TestRequest| {
        let path = req.path.split('?').next().unwrap_or_default();
        let Some(n) = path
            .strip_prefix("/hop/")
            .and_then(|n| n.parse::<u32>().ok())
        else {
            return TestResponse::status(404, "Not Found");
        };
        if n == 0 {
            TestResponse::ok(body)
        } else {
            TestResponse::redirect(302, &format!("/hop/{}", n - 1))
        }
    }
}
