// ABOUTME: Resource handling module for fetching article pages over HTTP.
// ABOUTME: Issues the GET, enforces a 200 status and a body size cap, then hands the raw body to the encoding normalizer.

pub mod encoding;

use bytes::{Bytes, BytesMut};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::error::ExtractError;

/// Largest page body accepted (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Result of a successful fetch. Owned by a single extraction call.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchedDocument {
    /// Decode the body as UTF-8 text, transcoding legacy charsets first.
    ///
    /// Encoding problems never fail: the untranscoded bytes are decoded lossily
    /// and a warning is logged.
    pub fn text_utf8(&self) -> String {
        let normalized = encoding::normalize(&self.body, self.content_type.as_deref());
        if let Some(warning) = &normalized.warning {
            tracing::warn!(url = %self.final_url, %warning, "encoding conversion failed, continuing with original body");
        }
        String::from_utf8_lossy(&normalized.body).into_owned()
    }
}

/// GET `url` with the given Accept header, requiring a 200 response.
///
/// Bodies over [`MAX_CONTENT_LENGTH`] fail with a body read error before they
/// are fully buffered.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    accept: &str,
) -> Result<FetchedDocument, ExtractError> {
    let mut response = client
        .get(url)
        .header(ACCEPT, accept)
        .send()
        .await
        .map_err(|e| {
            ExtractError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ExtractError::unexpected_status(url, "Fetch", status));
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    if let Some(len) = response.content_length() {
        if len > MAX_CONTENT_LENGTH as u64 {
            return Err(too_large(url));
        }
    }

    let mut body = BytesMut::new();
    loop {
        let chunk = response.chunk().await.map_err(|e| {
            ExtractError::body_read(
                url,
                "Fetch",
                Some(anyhow::anyhow!("failed to read body: {}", e)),
            )
        })?;
        let Some(chunk) = chunk else {
            break;
        };
        if body.len() + chunk.len() > MAX_CONTENT_LENGTH {
            return Err(too_large(url));
        }
        body.extend_from_slice(&chunk);
    }
    let body = body.freeze();

    Ok(FetchedDocument {
        status: status.as_u16(),
        final_url,
        content_type,
        body,
    })
}

fn too_large(url: &str) -> ExtractError {
    ExtractError::body_read(
        url,
        "Fetch",
        Some(anyhow::anyhow!("content larger than {} bytes", MAX_CONTENT_LENGTH)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const ACCEPT_HTML: &str = "text/html";

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/page").header("accept", ACCEPT_HTML);
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>hello</p>");
        });

        let doc = fetch(&create_test_client(), &server.url("/page"), ACCEPT_HTML)
            .await
            .expect("fetch should succeed");
        mock.assert();

        assert_eq!(doc.status, 200);
        assert_eq!(doc.content_type.as_deref(), Some("text/html; charset=utf-8"));
        assert_eq!(doc.text_utf8(), "<p>hello</p>");
    }

    #[tokio::test]
    async fn test_fetch_non_200_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not found");
        });

        let err = fetch(&create_test_client(), &server.url("/missing"), ACCEPT_HTML)
            .await
            .expect_err("should fail on 404");
        mock.assert();

        assert!(err.is_unexpected_status());
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_redirect_is_not_an_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/old");
            then.status(301).header("location", "/new");
        });
        server.mock(|when, then| {
            when.method(GET).path("/new");
            then.status(200).body("<p>moved</p>");
        });

        let doc = fetch(&create_test_client(), &server.url("/old"), ACCEPT_HTML)
            .await
            .expect("redirect should be followed");
        assert!(doc.final_url.ends_with("/new"));
        assert_eq!(doc.text_utf8(), "<p>moved</p>");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop a listener to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/page", port);

        let err = fetch(&create_test_client(), &url, ACCEPT_HTML)
            .await
            .expect_err("nothing is listening");
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_fetch_oversized_body_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/huge");
            then.status(200).body(vec![b'a'; MAX_CONTENT_LENGTH + 1]);
        });

        let err = fetch(&create_test_client(), &server.url("/huge"), ACCEPT_HTML)
            .await
            .expect_err("body exceeds the cap");
        assert!(err.is_body_read());
        assert!(err.to_string().contains("content larger than"));
    }

    #[tokio::test]
    async fn test_fetch_body_at_cap_accepted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/big");
            then.status(200).body(vec![b'a'; MAX_CONTENT_LENGTH]);
        });

        let doc = fetch(&create_test_client(), &server.url("/big"), ACCEPT_HTML)
            .await
            .expect("body at the cap is fine");
        assert_eq!(doc.body.len(), MAX_CONTENT_LENGTH);
    }

    #[test]
    fn text_utf8_transcodes_declared_charset() {
        let (encoded, _, _) = encoding_rs::WINDOWS_1251.encode("<p>Привет</p>");
        let doc = FetchedDocument {
            status: 200,
            final_url: "https://site.test/a".to_string(),
            content_type: Some("text/html; charset=windows-1251".to_string()),
            body: Bytes::from(encoded.into_owned()),
        };
        assert_eq!(doc.text_utf8(), "<p>Привет</p>");
    }
}
