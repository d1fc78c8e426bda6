//! Minimal HTTP/1.1 server for exercising [`RedditApiClient`](crate::RedditApiClient)
//! against canned responses. One response per connection, served in order.

use serde_json::json;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct CannedResponse {
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
}

impl CannedResponse {
    pub fn ok(body: String) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
            self.status,
            self.body.len()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

pub struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Serve `responses` in order, then stop accepting connections.
    pub async fn start(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            for response in responses {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };

                let mut buffer = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&buffer);
                let request_line = request.lines().next().unwrap_or_default().to_string();
                recorded.lock().unwrap().push(request_line);

                let _ = stream.write_all(&response.to_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request lines received so far, e.g. `GET /r/iphone/search?q=... HTTP/1.1`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// A search listing page holding posts `p{start}`..`p{end}`.
pub fn listing(ids: Range<usize>, after: Option<&str>) -> String {
    let children: Vec<_> = ids
        .map(|i| {
            json!({
                "kind": "t3",
                "data": {
                    "id": format!("p{}", i),
                    "title": format!("post {}", i),
                    "selftext": "",
                    "subreddit": "iphone",
                    "created_utc": 1700000000.0 + i as f64,
                    "score": 10,
                    "num_comments": 1,
                    "view_count": null,
                    "upvote_ratio": 0.9
                }
            })
        })
        .collect();

    json!({
        "kind": "Listing",
        "data": { "after": after, "before": null, "children": children }
    })
    .to_string()
}
