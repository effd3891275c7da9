//! Baidu AIP OCR Provider Implementation
//!
//! Two endpoints are involved:
//!
//! - `POST {base}/oauth/2.0/token` exchanges the API key and secret key for an
//!   access token (client-credentials grant)
//! - `POST {base}/rest/2.0/ocr/v1/general?access_token=...` recognizes text and
//!   returns each line with its pixel location
//!
//! A recognition call therefore costs one or two round trips: a token fetch when
//! the cached token is missing or near expiry, then the recognition itself.

use crate::token::{IssuedToken, TokenCache, TokenFetcher};
use crate::OcrError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use skymark_domain::traits::{TextRecognizer, TokenSource};
use skymark_domain::{BoundingBox, TextFragment};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://aip.baidubce.com";

/// Default timeout for one request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const TOKEN_PATH: &str = "/oauth/2.0/token";
const GENERAL_OCR_PATH: &str = "/rest/2.0/ocr/v1/general";

/// `error_code` values meaning the access token was rejected (invalid, expired)
const TOKEN_REJECTED_CODES: [i64; 2] = [110, 111];

/// Client-credentials token fetcher
pub struct BaiduTokenFetcher {
    base_url: String,
    api_key: String,
    secret_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Recognition response body
#[derive(Deserialize)]
struct GeneralResponse {
    #[serde(default)]
    words_result: Option<Vec<WordResult>>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Deserialize)]
struct WordResult {
    words: String,
    #[serde(default)]
    location: WordLocation,
}

#[derive(Deserialize, Default)]
struct WordLocation {
    #[serde(default)]
    left: i32,
    #[serde(default)]
    top: i32,
    #[serde(default)]
    width: i32,
    #[serde(default)]
    height: i32,
}

impl BaiduTokenFetcher {
    /// Create a fetcher sharing `client`'s connection pool and timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            client,
        }
    }
}

impl TokenFetcher for BaiduTokenFetcher {
    async fn fetch(&self) -> Result<IssuedToken, OcrError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), TOKEN_PATH);

        let response = self
            .client
            .post(&url)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.secret_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| OcrError::Token(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OcrError::Token(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(token_failure(status.as_u16(), body));
        }

        parse_token_response(&body)
    }
}

/// Map a non-success token response to an error
///
/// Bad credentials come back as 4xx with a JSON `error` field; anything else
/// keeps its status.
fn token_failure(status: u16, body: String) -> OcrError {
    match serde_json::from_str::<TokenResponse>(&body) {
        Ok(TokenResponse {
            error: Some(error),
            error_description,
            ..
        }) => OcrError::Token(format!(
            "{} (HTTP {}): {}",
            error,
            status,
            error_description.unwrap_or_default()
        )),
        _ => OcrError::Status { status, body },
    }
}

fn parse_token_response(body: &str) -> Result<IssuedToken, OcrError> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| OcrError::Token(format!("Failed to decode token response: {}", e)))?;

    if let Some(error) = response.error {
        let description = response.error_description.unwrap_or_default();
        return Err(OcrError::Token(format!("{}: {}", error, description)));
    }

    let value = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| OcrError::Token("Response carried no access_token".to_string()))?;

    Ok(IssuedToken {
        value,
        expires_in: Duration::from_secs(response.expires_in.unwrap_or(0)),
    })
}

fn parse_general_response(body: &str) -> Result<Vec<TextFragment>, OcrError> {
    let response: GeneralResponse = serde_json::from_str(body)
        .map_err(|e| OcrError::InvalidResponse(format!("Failed to decode OCR response: {}", e)))?;

    if let Some(code) = response.error_code {
        return Err(OcrError::Api {
            code,
            message: response.error_msg.unwrap_or_default(),
        });
    }

    let words = response
        .words_result
        .ok_or_else(|| OcrError::InvalidResponse("Missing words_result".to_string()))?;

    Ok(words
        .into_iter()
        .map(|w| {
            TextFragment::new(
                w.words,
                BoundingBox::new(w.location.left, w.location.top, w.location.width, w.location.height),
            )
        })
        .collect())
}

/// General OCR client with positioned output
pub struct BaiduOcrClient<T> {
    base_url: String,
    tokens: T,
    client: reqwest::Client,
}

impl<T> BaiduOcrClient<T> {
    /// Create a client that takes tokens from `tokens`
    pub fn new(base_url: impl Into<String>, tokens: T, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            tokens,
            client,
        }
    }

    /// Token holder used by this client
    pub fn tokens(&self) -> &T {
        &self.tokens
    }
}

impl BaiduOcrClient<TokenCache<BaiduTokenFetcher>> {
    /// Build a client and its token cache from credentials
    ///
    /// Both endpoints share one HTTP client with the given timeout.
    pub fn with_credentials(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
        refresh_margin: Duration,
    ) -> Result<Self, OcrError> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OcrError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        let fetcher = BaiduTokenFetcher::new(base_url.clone(), api_key, secret_key, client.clone());
        let tokens = TokenCache::new(fetcher, refresh_margin);

        Ok(Self::new(base_url, tokens, client))
    }
}

impl<T> BaiduOcrClient<T>
where
    T: TokenSource<Error = OcrError> + Sync,
{
    /// Recognize all text lines in `image` with their locations
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No access token can be obtained
    /// - The endpoint is unreachable, times out, or answers with a non-success status
    /// - The body carries an `error_code`
    pub async fn general(&self, image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        let token = self.tokens.valid_token().await?;
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), GENERAL_OCR_PATH);
        let encoded = BASE64.encode(image);

        debug!("Sending OCR request ({} image bytes)", image.len());

        let response = self
            .client
            .post(&url)
            .query(&[("access_token", token.as_str())])
            .form(&[("image", encoded.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OcrError::Communication(format!("Request timed out: {}", e))
                } else {
                    OcrError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OcrError::Communication(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(OcrError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match parse_general_response(&body) {
            Ok(fragments) => {
                debug!("OCR returned {} fragments", fragments.len());
                Ok(fragments)
            }
            Err(OcrError::Api { code, message }) if TOKEN_REJECTED_CODES.contains(&code) => {
                warn!("Access token rejected ({}: {}), dropping it", code, message);
                self.tokens.invalidate().await;
                Err(OcrError::Api { code, message })
            }
            Err(e) => Err(e),
        }
    }
}

impl<T> TextRecognizer for BaiduOcrClient<T>
where
    T: TokenSource<Error = OcrError> + Sync,
{
    type Error = OcrError;

    async fn recognize(&self, image: &[u8]) -> Result<Vec<TextFragment>, OcrError> {
        self.general(image).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct StaticToken {
        invalidations: AtomicUsize,
    }

    impl TokenSource for StaticToken {
        type Error = OcrError;

        async fn valid_token(&self) -> Result<String, OcrError> {
            Ok("24.static".to_string())
        }

        async fn invalidate(&self) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct NoToken;

    impl TokenSource for NoToken {
        type Error = OcrError;

        async fn valid_token(&self) -> Result<String, OcrError> {
            Err(OcrError::Token("unknown client id".to_string()))
        }

        async fn invalidate(&self) {}
    }

    /// Answer every connection with `status` and a JSON `body`; returns the base URL
    async fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                // Read headers plus the declared body before answering
                loop {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    let text = String::from_utf8_lossy(&request).to_ascii_lowercase();
                    if let Some(end) = text.find("\r\n\r\n") {
                        let length = text[..end]
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if request.len() >= end + 4 + length {
                            break;
                        }
                    }
                }

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_parse_token_response() {
        let body = r#"{"refresh_token":"r","expires_in":2592000,"scope":"public","access_token":"24.abc","session_key":"s"}"#;
        let token = parse_token_response(body).unwrap();
        assert_eq!(token.value, "24.abc");
        assert_eq!(token.expires_in, Duration::from_secs(2_592_000));
    }

    #[test]
    fn test_parse_token_error() {
        let body = r#"{"error":"invalid_client","error_description":"unknown client id"}"#;
        let err = parse_token_response(body).unwrap_err();
        match err {
            OcrError::Token(message) => assert!(message.contains("unknown client id")),
            other => panic!("Expected Token error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_token_missing_value() {
        let err = parse_token_response(r#"{"expires_in":10}"#).unwrap_err();
        assert!(matches!(err, OcrError::Token(_)));
    }

    #[test]
    fn test_parse_general_response_with_locations() {
        let body = r#"{
            "log_id": 1,
            "words_result_num": 2,
            "words_result": [
                {"words": "2024-01-15 14:30:45", "location": {"top": 12, "left": 900, "width": 300, "height": 30}},
                {"words": "北京市朝阳区监测站", "location": {"top": 1040, "left": 880, "width": 320, "height": 30}}
            ]
        }"#;
        let fragments = parse_general_response(body).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "2024-01-15 14:30:45");
        assert_eq!(fragments[0].bounding_box, BoundingBox::new(900, 12, 300, 30));
        assert_eq!(fragments[1].top(), 1040);
    }

    #[test]
    fn test_parse_general_response_without_locations() {
        let body = r#"{"words_result_num": 1, "words_result": [{"words": "北京市"}]}"#;
        let fragments = parse_general_response(body).unwrap();
        assert_eq!(fragments[0].bounding_box, BoundingBox::default());
    }

    #[test]
    fn test_parse_general_response_error_code() {
        let body = r#"{"error_code": 110, "error_msg": "Access token invalid or no longer valid"}"#;
        let err = parse_general_response(body).unwrap_err();
        assert!(matches!(err, OcrError::Api { code: 110, .. }));
    }

    #[test]
    fn test_parse_general_response_garbage() {
        let err = parse_general_response("not json").unwrap_err();
        assert!(matches!(err, OcrError::InvalidResponse(_)));

        let err = parse_general_response("{}").unwrap_err();
        assert!(matches!(err, OcrError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_token_failure_stops_before_recognition() {
        let client = BaiduOcrClient::new("http://127.0.0.1:9", NoToken, reqwest::Client::new());
        let err = client.general(b"image").await.unwrap_err();
        assert!(matches!(err, OcrError::Token(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let client = BaiduOcrClient::new("http://127.0.0.1:9", StaticToken::default(), http);
        let err = client.general(b"image").await.unwrap_err();
        assert!(matches!(err, OcrError::Communication(_)));
    }

    #[tokio::test]
    async fn test_rejected_token_is_invalidated() {
        let base_url = serve(
            "200 OK",
            r#"{"error_code": 110, "error_msg": "Access token invalid or no longer valid"}"#,
        )
        .await;
        let client = BaiduOcrClient::new(base_url, StaticToken::default(), reqwest::Client::new());

        let err = client.general(b"image").await.unwrap_err();
        assert!(matches!(err, OcrError::Api { code: 110, .. }));
        assert_eq!(client.tokens().invalidations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_api_errors_keep_token() {
        let base_url = serve("200 OK", r#"{"error_code": 17, "error_msg": "Open api daily request limit reached"}"#).await;
        let client = BaiduOcrClient::new(base_url, StaticToken::default(), reqwest::Client::new());

        let err = client.general(b"image").await.unwrap_err();
        assert!(matches!(err, OcrError::Api { code: 17, .. }));
        assert_eq!(client.tokens().invalidations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_recognition_against_local_endpoint() {
        let base_url = serve(
            "200 OK",
            r#"{"words_result_num": 1, "words_result": [{"words": "2024-01-15 14:30:45", "location": {"top": 5, "left": 1, "width": 2, "height": 3}}]}"#,
        )
        .await;
        let client = BaiduOcrClient::new(base_url, StaticToken::default(), reqwest::Client::new());

        let fragments = client.recognize(b"image").await.unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].top(), 5);
    }

    #[test]
    fn test_token_failure_with_error_field() {
        let err = token_failure(
            401,
            r#"{"error":"invalid_client","error_description":"unknown client id"}"#.to_string(),
        );
        match err {
            OcrError::Token(message) => {
                assert!(message.contains("invalid_client"));
                assert!(message.contains("401"));
            }
            other => panic!("Expected Token error, got {:?}", other),
        }
    }

    #[test]
    fn test_token_failure_keeps_status_for_non_json() {
        let err = token_failure(502, "<html>Internal Server Error</html>".to_string());
        assert!(matches!(err, OcrError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_token_fetch_server_error() {
        let base_url = serve("500 Internal Server Error", r#"{"message": "internal error"}"#).await;
        let fetcher = BaiduTokenFetcher::new(base_url, "ak", "sk", reqwest::Client::new());

        let err = fetcher.fetch().await.unwrap_err();
        assert!(matches!(err, OcrError::Status { status: 500, .. }));
    }

    #[test]
    fn test_with_credentials_builds_cache() {
        let client = BaiduOcrClient::with_credentials(
            DEFAULT_BASE_URL,
            "ak",
            "sk",
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Duration::from_secs(300),
        )
        .unwrap();
        assert_eq!(client.tokens().refresh_margin(), Duration::from_secs(300));
    }
}
