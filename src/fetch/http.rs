// src/fetch/http.rs
// =============================================================================
// The production Fetcher: a thin wrapper around a reqwest Client.
//
// Client settings:
// - configurable timeout (the only deadline the crawler ever imposes)
// - follow up to 5 redirects (enough for the usual http -> https -> www hops,
//   low enough to break redirect loops quickly)
// - a honest user agent so site owners know who crawled them
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};

use super::{FetchError, FetchedPage, Fetcher};

const USER_AGENT: &str = concat!("mail-hunter/", env!("CARGO_PKG_VERSION"));

/// Fetches pages over HTTP(S) with a shared connection pool.
///
/// Cloning is cheap (reqwest clients are internally reference counted), but
/// the crawler wraps one instance in an Arc and shares it across workers.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

// Pulls status and content-type out of a response, rejecting non-2xx.
fn metadata_of(response: &Response) -> Result<(u16, Option<String>), FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    Ok((status.as_u16(), content_type))
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;
        let (status, content_type) = metadata_of(&response)?;
        let body = response.bytes().await?.to_vec();
        Ok(FetchedPage {
            status,
            content_type,
            body,
        })
    }

    async fn fetch_head(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.head(url).send().await?;
        let (status, content_type) = metadata_of(&response)?;
        Ok(FetchedPage {
            status,
            content_type,
            body: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_status_content_type_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<html>hello</html>")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let page = fetcher.fetch(&format!("{}/page", server.url())).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.status, 200);
        assert_eq!(
            page.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
        assert_eq!(page.body, b"<html>hello</html>");
    }

    #[tokio::test]
    async fn test_non_2xx_is_a_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.url())).await;

        match result {
            Err(FetchError::Status(code)) => assert_eq!(code, 404),
            other => panic!("expected Status error, got {:?}", other.map(|p| p.status)),
        }
    }

    #[tokio::test]
    async fn test_head_skips_the_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("HEAD", "/page")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let page = fetcher
            .fetch_head(&format!("{}/page", server.url()))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.content_type.as_deref(), Some("application/pdf"));
        assert!(page.body.is_empty());
    }
}
