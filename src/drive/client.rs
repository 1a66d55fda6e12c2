use super::{ensure_success, AuthProvider, DocumentStore, DriveFile, PDF_MIME};
use crate::error::{Error, Result};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde_json::json;
use tracing::debug;
use url::Url;

pub const API_BASE: &str = "https://www.googleapis.com/drive/v3/";
pub const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3/";

/// Authorized client for the Drive v3 REST API
pub struct DriveClient {
    http: reqwest::Client,
    token: String,
    api_base: Url,
    upload_base: Url,
}

impl DriveClient {
    /// Build an HTTP client and authorize it with `auth`
    pub async fn connect<A: AuthProvider>(auth: &A) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("drivesplit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let token = auth.access_token(&http).await?;
        Self::with_endpoints(http, token, API_BASE, UPLOAD_BASE)
    }

    pub fn with_endpoints(
        http: reqwest::Client,
        token: String,
        api_base: &str,
        upload_base: &str,
    ) -> Result<Self> {
        Ok(DriveClient {
            http,
            token,
            api_base: Url::parse(api_base)?,
            upload_base: Url::parse(upload_base)?,
        })
    }

    /// `{api_base}files/{id}` with the id percent-encoded as one path segment
    fn file_url(&self, id: &str) -> Result<Url> {
        let mut url = self.api_base.join("files/")?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        Ok(url)
    }
}

impl DocumentStore for DriveClient {
    async fn file(&self, id: &str) -> Result<DriveFile> {
        let url = self.file_url(id)?;
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("fields", "id,name,mimeType"), ("supportsAllDrives", "true")])
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.file_url(id)?;
        debug!("GET {} (media)", url);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await?;
        let bytes = ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Resumable upload: open a session with the metadata, then PUT the content
    async fn upload(&self, name: &str, folder_id: &str, bytes: Vec<u8>) -> Result<DriveFile> {
        let url = self.upload_base.join("files")?;
        let metadata = json!({
            "name": name,
            "parents": [folder_id],
            "mimeType": PDF_MIME,
        });

        debug!("Opening upload session for {} ({} bytes)", name, bytes.len());
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .query(&[("uploadType", "resumable"), ("supportsAllDrives", "true")])
            .header("X-Upload-Content-Type", PDF_MIME)
            .header("X-Upload-Content-Length", bytes.len())
            .json(&metadata)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let session = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::MissingUploadLocation(name.to_string()))?;

        let response = self
            .http
            .put(session)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, PDF_MIME)
            .body(bytes)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::test_server::{http, json, response, TestServer};

    fn client(base: &str) -> DriveClient {
        DriveClient::with_endpoints(
            http(),
            "ya29.test".into(),
            &format!("{}drive/v3/", base),
            &format!("{}upload/drive/v3/", base),
        )
        .unwrap()
    }

    #[test]
    fn test_file_url_encodes_id() {
        let client = client("https://example.com/");
        assert_eq!(
            client.file_url("abc_123-XYZ").unwrap().as_str(),
            "https://example.com/drive/v3/files/abc_123-XYZ"
        );
        assert_eq!(
            client.file_url("a/b?c").unwrap().as_str(),
            "https://example.com/drive/v3/files/a%2Fb%3Fc"
        );
    }

    #[tokio::test]
    async fn test_file_metadata() {
        let server = TestServer::bind().await;
        let client = client(&server.url());
        let handle = server.serve(vec![json(
            r#"{"id": "f1", "name": "Report.pdf", "mimeType": "application/pdf"}"#,
        )]);

        let file = client.file("f1").await.unwrap();
        assert_eq!(file.name, "Report.pdf");
        assert_eq!(file.mime_type.as_deref(), Some(PDF_MIME));

        let requests = handle.await.unwrap();
        assert!(requests[0].starts_with("GET /drive/v3/files/f1?"));
        assert!(requests[0].contains("supportsAllDrives=true"));
        assert!(requests[0]
            .to_lowercase()
            .contains("authorization: bearer ya29.test"));
    }

    #[tokio::test]
    async fn test_download_not_found() {
        let server = TestServer::bind().await;
        let client = client(&server.url());
        let handle = server.serve(vec![response("404 Not Found", &[], "File not found: f9")]);

        let err = client.download("f9").await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_resumable_upload() {
        let server = TestServer::bind().await;
        let base = server.url();
        let client = client(&base);
        let session = format!("{}upload/drive/v3/files?uploadType=resumable&upload_id=xyz", base);
        let handle = server.serve(vec![
            response("200 OK", &[("Location", session.as_str())], ""),
            json(r#"{"id": "new1", "name": "Report_1-4.pdf"}"#),
        ]);

        let file = client
            .upload("Report_1-4.pdf", "folder9", b"%PDF-1.7".to_vec())
            .await
            .unwrap();
        assert_eq!(file.id, "new1");

        let requests = handle.await.unwrap();
        assert!(requests[0].starts_with("POST /upload/drive/v3/files?uploadType=resumable"));
        assert!(requests[0].contains(r#""parents":["folder9"]"#));
        assert!(requests[0].contains(r#""name":"Report_1-4.pdf""#));
        assert!(requests[1].starts_with("PUT /upload/drive/v3/files?uploadType=resumable&upload_id=xyz"));
        assert!(requests[1].ends_with("%PDF-1.7"));
    }

    #[tokio::test]
    async fn test_upload_without_location() {
        let server = TestServer::bind().await;
        let client = client(&server.url());
        let handle = server.serve(vec![response("200 OK", &[], "")]);

        let err = client
            .upload("x.pdf", "folder", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingUploadLocation(_)));
        handle.await.unwrap();
    }
}
