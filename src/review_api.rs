use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Source of homework status payloads.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Fetch statuses changed since `from_date` (unix seconds, inclusive).
    async fn homework_statuses(&self, from_date: i64) -> Result<Value>;
}

#[derive(Clone)]
pub struct ReviewClient {
    http: Client,
    endpoint: Url,
    token: String,
}

impl fmt::Debug for ReviewClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ReviewClient {
    pub fn new(token: String, endpoint: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent("homework-watchbot/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(Error::Client)?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    pub fn build_request(&self, from_date: i64) -> Result<reqwest::Request> {
        self.http
            .get(self.endpoint.clone())
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .build()
            .map_err(Error::Client)
    }
}

#[async_trait]
impl ReviewApi for ReviewClient {
    #[instrument(skip(self))]
    async fn homework_statuses(&self, from_date: i64) -> Result<Value> {
        let request = self.build_request(from_date)?;
        debug!(url=%request.url(), "requesting homework statuses");
        let res = self
            .http
            .execute(request)
            .await
            .map_err(Error::Transport)?;
        let status = res.status();
        let body = res.text().await.map_err(Error::Transport)?;
        decode_response(status, &body)
    }
}

/// Turn a raw HTTP response into a JSON payload. Anything but 200 is a
/// failure carrying the numeric status code.
pub fn decode_response(status: StatusCode, body: &str) -> Result<Value> {
    if status != StatusCode::OK {
        return Err(Error::UnexpectedStatus(status.as_u16()));
    }
    serde_json::from_str(body).map_err(Error::InvalidJson)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn client() -> ReviewClient {
        let endpoint = Url::parse("https://reviews.example/api/homework_statuses/").unwrap();
        ReviewClient::new("secret".into(), endpoint, Some(Duration::from_secs(5))).unwrap()
    }

    #[test]
    fn build_request_sets_auth_and_cursor() {
        let request = client().build_request(1_700_000_000).unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/api/homework_statuses/");
        assert_eq!(request.url().query(), Some("from_date=1700000000"));
        assert_eq!(
            request
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .unwrap(),
            "OAuth secret"
        );
    }

    #[test]
    fn malformed_token_is_a_local_failure() {
        let endpoint = Url::parse("https://reviews.example/api/homework_statuses/").unwrap();
        let client = ReviewClient::new("line\nbreak".into(), endpoint, None).unwrap();
        let err = client.build_request(1).unwrap_err();
        assert!(matches!(err, Error::Client(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", client());
        assert!(rendered.contains("reviews.example"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn decode_ok_returns_payload_unmodified() {
        let body = r#"{"homeworks": [], "current_date": 5, "extra": {"a": 1}}"#;
        let value = decode_response(StatusCode::OK, body).unwrap();
        assert_eq!(value, json!({"homeworks": [], "current_date": 5, "extra": {"a": 1}}));
    }

    #[test]
    fn decode_non_ok_carries_status_code() {
        for status in [
            StatusCode::NO_CONTENT,
            StatusCode::UNAUTHORIZED,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = decode_response(status, "{}").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Protocol);
            assert!(err.to_string().contains(&status.as_u16().to_string()));
        }
    }

    #[test]
    fn decode_invalid_json() {
        let err = decode_response(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, Error::InvalidJson(_)));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn decode_does_not_judge_shape() {
        let value = decode_response(StatusCode::OK, "[1, 2]").unwrap();
        assert_eq!(value, json!([1, 2]));
    }
}
