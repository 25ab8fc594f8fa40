//! API client for the booking backend.
//!
//! This module provides the `ApiClient` struct for signing in, registering,
//! reading the current profile, listing mentors and booking appointments.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    AppointmentRequest, AuthResponse, LoginRequest, Mentor, RegisterRequest, UserProfile,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the booking backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Start rate-limit backoff at `initial` instead of the default second.
    pub fn with_retry_backoff(mut self, initial: Duration) -> Self {
        self.initial_backoff = initial;
        self
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
            initial_backoff: self.initial_backoff,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Token is not a valid header value")?,
            );
        }
        Ok(headers)
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    fn expect_status(response: &reqwest::Response, expected: StatusCode) -> Result<()> {
        if response.status() == expected {
            Ok(())
        } else {
            Err(ApiError::InvalidResponse(format!(
                "expected status {}, got {}",
                expected,
                response.status()
            ))
            .into())
        }
    }

    /// Send a request, backing off and retrying while rate limited.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .headers(self.auth_headers()?);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    debug!(%method, url = %url, status = %response.status(), "Request succeeded");
                    return Ok(response);
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute::<()>(Method::GET, path, None).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    // ===== Auth =====

    /// Sign in. The backend answers 200 with a token.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let response = self
            .execute(Method::POST, "/auth/login", Some(request))
            .await
            .context("Login request failed")?;
        Self::expect_status(&response, StatusCode::OK)?;
        response.json().await.context("Failed to parse login response")
    }

    /// Create an account. The backend answers 201, optionally with a token.
    pub async fn signup(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let response = self
            .execute(Method::POST, "/auth/signup", Some(request))
            .await
            .context("Signup request failed")?;
        Self::expect_status(&response, StatusCode::CREATED)?;

        let text = response.text().await.context("Failed to read signup response")?;
        if text.trim().is_empty() {
            return Ok(AuthResponse::default());
        }
        serde_json::from_str(&text).context("Failed to parse signup response")
    }

    /// Profile of the user the bearer token belongs to
    pub async fn me(&self) -> Result<UserProfile> {
        self.get("/auth/me").await
    }

    // ===== Booking =====

    /// Mentors available for booking
    pub async fn mentors(&self) -> Result<Vec<Mentor>> {
        let value: Value = self.get("/mentors").await?;
        Ok(parse_mentor_list(value))
    }

    /// Submit an appointment request
    pub async fn book(&self, request: &AppointmentRequest) -> Result<()> {
        self.execute(Method::POST, "/appointments", Some(request))
            .await
            .context("Booking request failed")?;
        Ok(())
    }
}

/// Mentor list from a `/mentors` body. Anything other than an array counts
/// as no mentors; entries that cannot be booked (no `_id`) are skipped.
fn parse_mentor_list(value: Value) -> Vec<Mentor> {
    let Value::Array(entries) = value else {
        debug!("Mentor response is not an array, treating as empty");
        return Vec::new();
    };
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Mentor>(entry) {
            Ok(mentor) => Some(mentor),
            Err(e) => {
                warn!(error = %e, "Skipping unusable mentor entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedResponse, CannedServer};
    use serde_json::json;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:5000/api/").expect("client");
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.url("/auth/login"), "http://localhost:5000/api/auth/login");
        assert_eq!(client.url("mentors"), "http://localhost:5000/api/mentors");
    }

    #[test]
    fn test_auth_headers() {
        let client = ApiClient::new("http://localhost").expect("client");
        assert!(client.auth_headers().expect("headers").is_empty());

        let authed = client.with_token("abc.def.ghi".to_string());
        let headers = authed.auth_headers().expect("headers");
        assert_eq!(
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer abc.def.ghi")
        );

        let bad = client.with_token("line\nbreak".to_string());
        assert!(bad.auth_headers().is_err());
    }

    #[test]
    fn test_parse_mentor_list() {
        let mentors = parse_mentor_list(json!([
            {"_id": "m1", "name": "Ravi", "email": "ravi@example.com"},
            {"_id": "m2", "name": "Meera"}
        ]));
        assert_eq!(mentors.len(), 2);
        assert_eq!(mentors[0].id, "m1");
        assert_eq!(mentors[1].email, "");
    }

    #[test]
    fn test_parse_mentor_list_non_array_is_empty() {
        assert!(parse_mentor_list(json!({"mentors": []})).is_empty());
        assert!(parse_mentor_list(Value::Null).is_empty());
    }

    #[test]
    fn test_parse_mentor_list_keeps_usable_entries() {
        let mentors = parse_mentor_list(json!([
            {"name": "no id"},
            {"_id": "m3"},
            "stray",
            {"_id": "m4", "name": "Kiran", "expertise": ["careers"]}
        ]));
        let ids: Vec<&str> = mentors.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m3", "m4"]);
        assert_eq!(mentors[0].name, "");
        assert_eq!(mentors[1].name, "Kiran");
    }

    // ===== Against a local backend =====

    fn client_for(server: &CannedServer) -> ApiClient {
        ApiClient::new(server.base_url())
            .expect("client")
            .with_retry_backoff(Duration::from_millis(1))
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    fn api_error(err: &anyhow::Error) -> Option<&ApiError> {
        err.chain().find_map(|cause| cause.downcast_ref::<ApiError>())
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let server = CannedServer::start(vec![CannedResponse::json(
            200,
            r#"{"token": "h.p.s", "message": "Login successful"}"#,
        )])
        .await
        .expect("server");

        let response = client_for(&server).login(&login_request()).await.expect("login");
        assert_eq!(response.token.as_deref(), Some("h.p.s"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/auth/login");
        let body: Value = serde_json::from_str(&requests[0].body).expect("json body");
        assert_eq!(body, json!({"email": "asha@example.com", "password": "secret1"}));
    }

    #[tokio::test]
    async fn test_login_surfaces_server_message() {
        let server = CannedServer::start(vec![CannedResponse::json(
            401,
            r#"{"message": "Invalid credentials"}"#,
        )])
        .await
        .expect("server");

        let err = client_for(&server).login(&login_request()).await.unwrap_err();
        assert!(matches!(api_error(&err), Some(ApiError::Unauthorized(_))));
        assert_eq!(crate::api::server_message(&err), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_login_requires_exactly_200() {
        let server = CannedServer::start(vec![CannedResponse::json(201, r#"{"token": "h.p.s"}"#)])
            .await
            .expect("server");

        let err = client_for(&server).login(&login_request()).await.unwrap_err();
        assert!(matches!(api_error(&err), Some(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_signup_with_token_and_with_empty_body() {
        let server = CannedServer::start(vec![
            CannedResponse::json(201, r#"{"token": "h.p.s"}"#),
            CannedResponse::empty(201),
        ])
        .await
        .expect("server");
        let client = client_for(&server);

        let with_token = client.signup(&register_request()).await.expect("signup");
        assert_eq!(with_token.token.as_deref(), Some("h.p.s"));

        let empty = client.signup(&register_request()).await.expect("signup");
        assert_eq!(empty.token, None);
        assert_eq!(server.requests()[1].path, "/auth/signup");
    }

    #[tokio::test]
    async fn test_signup_requires_exactly_201() {
        let server = CannedServer::start(vec![CannedResponse::json(200, r#"{"token": "h.p.s"}"#)])
            .await
            .expect("server");

        let err = client_for(&server).signup(&register_request()).await.unwrap_err();
        assert!(matches!(api_error(&err), Some(ApiError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_rate_limited_request_is_retried() {
        let server = CannedServer::start(vec![
            CannedResponse::empty(429),
            CannedResponse::empty(429),
            CannedResponse::json(200, r#"[{"_id": "m1", "name": "Ravi"}]"#),
        ])
        .await
        .expect("server");

        let mentors = client_for(&server).mentors().await.expect("mentors");
        assert_eq!(mentors.len(), 1);
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up_after_max_retries() {
        let server = CannedServer::start(vec![CannedResponse::empty(429); 5])
            .await
            .expect("server");

        let err = client_for(&server).mentors().await.unwrap_err();
        assert!(matches!(api_error(&err), Some(ApiError::RateLimited)));
        assert_eq!(server.requests().len(), MAX_RATE_LIMIT_RETRIES as usize + 1);
    }

    #[tokio::test]
    async fn test_book_sends_bearer_token_and_camel_case_body() {
        let server = CannedServer::start(vec![CannedResponse::json(201, r#"{"_id": "a1"}"#)])
            .await
            .expect("server");
        let client = client_for(&server).with_token("h.p.s".to_string());

        let request = AppointmentRequest {
            junior_name: "Asha".to_string(),
            junior_email: "asha@example.com".to_string(),
            semester: "3".to_string(),
            description: "Exam stress".to_string(),
            mentor: "m1".to_string(),
            date: "2025-03-14T00:00:00.000Z".to_string(),
        };
        client.book(&request).await.expect("book");

        let requests = server.requests();
        assert_eq!(requests[0].path, "/appointments");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer h.p.s"));
        let body: Value = serde_json::from_str(&requests[0].body).expect("json body");
        assert_eq!(body["juniorEmail"], "asha@example.com");
        assert_eq!(body["mentor"], "m1");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let client = ApiClient::new(&format!("http://{}", addr)).expect("client");
        let err = client.login(&login_request()).await.unwrap_err();
        assert!(matches!(api_error(&err), Some(ApiError::NetworkError(_))));
    }
}
