pub mod auth;
pub mod client;

pub use auth::{AuthProvider, Credentials};
pub use client::DriveClient;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const PDF_MIME: &str = "application/pdf";

/// File metadata as returned by the drive API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Where source documents come from and split parts go to.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn file(&self, id: &str) -> Result<DriveFile>;

    async fn download(&self, id: &str) -> Result<Vec<u8>>;

    async fn upload(&self, name: &str, folder_id: &str, bytes: Vec<u8>) -> Result<DriveFile>;
}

/// Turn a non-2xx response into `Error::HttpStatus`, keeping the body for diagnostics
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(Error::HttpStatus {
        url,
        status: status.as_u16(),
        body,
    })
}

/// Minimal HTTP/1.1 server that answers one canned response per connection.
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    pub struct TestServer {
        listener: TcpListener,
    }

    impl TestServer {
        pub async fn bind() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            TestServer { listener }
        }

        pub fn url(&self) -> String {
            format!("http://{}/", self.listener.local_addr().unwrap())
        }

        /// Serve `responses` in order and return the raw requests received
        pub fn serve(self, responses: Vec<String>) -> JoinHandle<Vec<String>> {
            tokio::spawn(async move {
                let mut requests = Vec::new();
                for response in responses {
                    let (mut stream, _) = self.listener.accept().await.unwrap();
                    let request = read_request(&mut stream).await;
                    requests.push(request);
                    stream.write_all(response.as_bytes()).await.unwrap();
                    stream.shutdown().await.unwrap();
                }
                requests
            })
        }
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!("HTTP/1.1 {}\r\n", status);
        for (name, value) in headers {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        out.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));
        out
    }

    /// HTTP client that ignores proxy settings from the environment
    pub fn http() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    pub fn json(body: &str) -> String {
        response("200 OK", &[("Content-Type", "application/json")], body)
    }
}
