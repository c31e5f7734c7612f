//! HTTP backend.
//!
//! Async JSON client using `reqwest` with optional Bearer token
//! authentication against a REST-style listing API.

use std::time::Duration;

use apkstore_protocol::{
    Category, Listing, ListingEntry, ListingId, Principal, UserProfile, UserRole,
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::BackendError;
use crate::remote::{BackendFuture, RemoteData};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`RemoteData`] implementation over HTTP.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a client for `base_url`, authenticating with `api_token` when given.
    pub fn new(base_url: &str, api_token: Option<&str>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, api_token, DEFAULT_TIMEOUT)
    }

    /// Same as [`new`](Self::new) with a custom per-request timeout.
    pub fn with_timeout(
        base_url: &str,
        api_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = api_token.filter(|t| !t.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| BackendError::InvalidToken)?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        self.http.request(method, url)
    }

    /// Sends a request and returns the body of a successful response.
    async fn execute(&self, req: RequestBuilder, endpoint: &str) -> Result<Vec<u8>, BackendError> {
        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.bytes().await?.to_vec());
        }

        let body = resp.text().await.unwrap_or_default();
        debug!(endpoint, status = status.as_u16(), "backend request rejected");
        match status.as_u16() {
            401 | 403 => Err(BackendError::Unauthorized(if body.is_empty() {
                endpoint.to_string()
            } else {
                body
            })),
            404 => Err(BackendError::NotFound(endpoint.to_string())),
            code => Err(BackendError::Api { status: code, body }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, BackendError> {
        let req = self.request(Method::GET, endpoint).query(params);
        let body = self.execute(req, endpoint).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET that maps a 404 to `None`.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Option<T>, BackendError> {
        match self.get_json(endpoint, &[]).await {
            Ok(value) => Ok(Some(value)),
            Err(BackendError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, BackendError> {
        let mut req = self.request(method, endpoint);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.execute(req, endpoint).await
    }
}

/// Encodes a single path segment.
fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, NON_ALPHANUMERIC).to_string()
}

fn listing_endpoint(id: &ListingId) -> String {
    format!("/listings/{}", segment(id.as_str()))
}

impl RemoteData for HttpBackend {
    fn add_listing(&self, listing: &Listing) -> BackendFuture<'_, ListingId> {
        let listing = listing.clone();
        Box::pin(async move {
            let body = self
                .send_json(Method::POST, "/listings", Some(&listing))
                .await?;
            let id: ListingId = serde_json::from_slice(&body)?;
            debug!(id = %id, name = %listing.name, "listing added");
            Ok(id)
        })
    }

    fn update_listing(&self, id: &ListingId, listing: &Listing) -> BackendFuture<'_, ()> {
        let endpoint = listing_endpoint(id);
        let listing = listing.clone();
        Box::pin(async move {
            self.send_json(Method::PUT, &endpoint, Some(&listing))
                .await?;
            Ok(())
        })
    }

    fn delete_listing(&self, id: &ListingId) -> BackendFuture<'_, ()> {
        let endpoint = listing_endpoint(id);
        Box::pin(async move {
            self.send_json::<()>(Method::DELETE, &endpoint, None).await?;
            Ok(())
        })
    }

    fn get_listing(&self, id: &ListingId) -> BackendFuture<'_, Option<Listing>> {
        let endpoint = listing_endpoint(id);
        Box::pin(async move { self.get_optional(&endpoint).await })
    }

    fn get_all_listings(&self) -> BackendFuture<'_, Vec<ListingEntry>> {
        Box::pin(async move { self.get_json("/listings", &[]).await })
    }

    fn get_listings_by_category(&self, category: Category) -> BackendFuture<'_, Vec<ListingEntry>> {
        Box::pin(async move {
            self.get_json("/listings", &[("category", category.as_str().to_string())])
                .await
        })
    }

    fn search_listings(&self, term: &str) -> BackendFuture<'_, Vec<ListingEntry>> {
        let term = term.to_string();
        Box::pin(async move { self.get_json("/listings/search", &[("q", term)]).await })
    }

    fn get_caller_user_profile(&self) -> BackendFuture<'_, Option<UserProfile>> {
        Box::pin(async move { self.get_optional("/me/profile").await })
    }

    fn save_caller_user_profile(&self, profile: &UserProfile) -> BackendFuture<'_, ()> {
        let profile = profile.clone();
        Box::pin(async move {
            self.send_json(Method::PUT, "/me/profile", Some(&profile))
                .await?;
            Ok(())
        })
    }

    fn get_caller_user_role(&self) -> BackendFuture<'_, UserRole> {
        Box::pin(async move { self.get_json("/me/role", &[]).await })
    }

    fn is_caller_admin(&self) -> BackendFuture<'_, bool> {
        Box::pin(async move { self.get_json("/me/admin", &[]).await })
    }

    fn assign_caller_user_role(&self, user: &Principal, role: UserRole) -> BackendFuture<'_, ()> {
        let endpoint = format!("/users/{}/role", segment(user.as_str()));
        Box::pin(async move {
            self.send_json(Method::PUT, &endpoint, Some(&role)).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Starts a one-shot mock HTTP server replying with `status` and `body`.
    ///
    /// The receiver yields the raw request head and body the client sent.
    async fn mock_server(
        status: u16,
        body: &str,
    ) -> (String, oneshot::Receiver<String>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let body = body.to_string();
        let (tx, rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let request = read_request(&mut stream).await;
                let _ = tx.send(request);

                let resp = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, rx, handle)
    }

    /// Reads the request head plus a `Content-Length` body.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&data).to_string();
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= head_end + 4 + content_length {
                break;
            }
        }
        String::from_utf8_lossy(&data).to_string()
    }

    fn sample_listing() -> Listing {
        Listing {
            name: "Battle Royale".into(),
            description: "Last one standing".into(),
            download_url: "https://example.com/br.apk".into(),
            file_size: 1024,
            version: "2.0".into(),
            mod_features: vec!["Unlimited Coins".into()],
            category: Category::Game,
            icon_url: String::new(),
        }
    }

    #[tokio::test]
    async fn get_all_listings_parses_pairs() {
        let json = r#"[
            ["1",{"name":"Pro Tool","description":"","downloadUrl":"u","fileSize":10,"version":"1","modFeatures":[],"category":"app","iconUrl":""}],
            ["2",{"name":"Battle Royale","description":"","downloadUrl":"u","fileSize":20,"version":"1","modFeatures":["A"],"category":"game","iconUrl":""}]
        ]"#;
        let (url, rx, handle) = mock_server(200, json).await;

        let backend = HttpBackend::new(&url, None).unwrap();
        let listings = backend.get_all_listings().await.unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].0.as_str(), "1");
        assert_eq!(listings[1].1.category, Category::Game);
        assert!(rx.await.unwrap().starts_with("GET /listings HTTP/1.1"));

        handle.abort();
    }

    #[tokio::test]
    async fn add_listing_posts_json_and_returns_id() {
        let (url, rx, handle) = mock_server(200, r#""42""#).await;

        let backend = HttpBackend::new(&url, Some("secret")).unwrap();
        let id = backend.add_listing(&sample_listing()).await.unwrap();
        assert_eq!(id.as_str(), "42");

        let request = rx.await.unwrap();
        assert!(request.starts_with("POST /listings HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: bearer secret"));
        assert!(request.contains(r#""downloadUrl":"https://example.com/br.apk""#));

        handle.abort();
    }

    #[tokio::test]
    async fn category_query_parameter() {
        let (url, rx, handle) = mock_server(200, "[]").await;

        let backend = HttpBackend::new(&url, None).unwrap();
        let listings = backend
            .get_listings_by_category(Category::Game)
            .await
            .unwrap();
        assert!(listings.is_empty());
        assert!(rx.await.unwrap().starts_with("GET /listings?category=game "));

        handle.abort();
    }

    #[tokio::test]
    async fn listing_id_is_path_encoded() {
        let (url, rx, handle) = mock_server(200, "").await;

        let backend = HttpBackend::new(&url, None).unwrap();
        backend
            .delete_listing(&ListingId::new("a/b c"))
            .await
            .unwrap();
        assert!(rx.await.unwrap().starts_with("DELETE /listings/a%2Fb%20c "));

        handle.abort();
    }

    #[tokio::test]
    async fn missing_profile_is_none() {
        let (url, _rx, handle) = mock_server(404, "").await;

        let backend = HttpBackend::new(&url, None).unwrap();
        let profile = backend.get_caller_user_profile().await.unwrap();
        assert!(profile.is_none());

        handle.abort();
    }

    #[tokio::test]
    async fn forbidden_maps_to_unauthorized() {
        let (url, _rx, handle) = mock_server(403, "only users can add listings").await;

        let backend = HttpBackend::new(&url, None).unwrap();
        let err = backend.add_listing(&sample_listing()).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Unauthorized: only users can add listings");

        handle.abort();
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let (url, _rx, handle) = mock_server(500, "boom").await;

        let backend = HttpBackend::new(&url, None).unwrap();
        let err = backend.is_caller_admin().await.unwrap_err();
        assert!(
            matches!(err, BackendError::Api { status: 500, ref body } if body == "boom"),
            "unexpected error: {err}"
        );

        handle.abort();
    }

    #[test]
    fn trailing_slash_trimmed() {
        let backend = HttpBackend::new("http://localhost:8080/api/", None).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn invalid_token_rejected() {
        let result = HttpBackend::new("http://localhost", Some("bad\ntoken"));
        assert!(matches!(result, Err(BackendError::InvalidToken)));
    }
}
