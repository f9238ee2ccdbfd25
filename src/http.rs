use std::time::Duration;

use thiserror::Error;

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const READ_TIMEOUT: Duration = Duration::from_secs(10);

const FETCH_STATUS_MESSAGE: &str = "Something went wrong... Retrying";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum FetchError {
    #[error("request failed: HTTP status {status}")]
    HttpStatus { status: u16 },
    #[error("{0}")]
    Transport(String),
    #[error("{operation} is not supported by the {backend} source")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },
    #[error("invalid movie id '{id}'")]
    InvalidId { id: String },
}

impl FetchError {
    /// Text shown to the user when a fetch attempt ends with this error.
    pub(crate) fn user_message(&self) -> String {
        match self {
            Self::HttpStatus { .. } => FETCH_STATUS_MESSAGE.to_string(),
            Self::Transport(message) => message.clone(),
            Self::Unsupported { .. } | Self::InvalidId { .. } => self.to_string(),
        }
    }

    /// Whether a failed fetch with this error starts a retry cycle.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(self, Self::HttpStatus { .. } | Self::Transport(_))
    }
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => Self::HttpStatus { status },
            ureq::Error::Transport(err) => Self::Transport(format!("transport error: {err}")),
        }
    }
}

/// Thin blocking client; one agent shared by every request of a store.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub(crate) fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT, READ_TIMEOUT)
    }

    pub(crate) fn with_timeouts(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .timeout_write(read_timeout)
            .build();
        Self { agent }
    }

    pub(crate) fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(%url, "GET");
        let response = self.agent.get(url).call()?;
        read_body(response)
    }

    pub(crate) fn post_json(&self, url: &str, body: &str) -> Result<String, FetchError> {
        tracing::debug!(%url, "POST");
        let response = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_string(body)?;
        read_body(response)
    }

    pub(crate) fn delete(&self, url: &str) -> Result<(), FetchError> {
        tracing::debug!(%url, "DELETE");
        self.agent.delete(url).call()?;
        Ok(())
    }
}

fn read_body(response: ureq::Response) -> Result<String, FetchError> {
    response
        .into_string()
        .map_err(|err| FetchError::Transport(format!("response decode failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{Behavior, TestServer};

    fn quick_client() -> HttpClient {
        HttpClient::with_timeouts(Duration::from_millis(200), Duration::from_millis(200))
    }

    #[test]
    fn get_returns_body_on_success() {
        let server = TestServer::spawn(vec![Behavior::Respond(200, "ok".to_string())]);
        let body = quick_client()
            .get_text(&server.url("/films/"))
            .expect("200 should succeed");
        assert_eq!(body, "ok");
        assert_eq!(server.request_count(), 1);
        assert_eq!(server.requests()[0].path, "/films/");
    }

    #[test]
    fn non_success_status_maps_to_status_error_with_fixed_message() {
        let server = TestServer::spawn(vec![Behavior::Respond(500, "boom".to_string())]);
        let err = quick_client()
            .get_text(&server.url("/"))
            .expect_err("500 should fail");
        assert_eq!(err, FetchError::HttpStatus { status: 500 });
        assert_eq!(err.user_message(), "Something went wrong... Retrying");
        assert!(err.is_retryable());
    }

    #[test]
    fn requests_are_not_retried_inside_the_client() {
        let server = TestServer::spawn(vec![
            Behavior::Respond(503, "down".to_string()),
            Behavior::Respond(200, "ok".to_string()),
        ]);
        assert!(quick_client().get_text(&server.url("/")).is_err());
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn slow_response_surfaces_transport_error() {
        let server = TestServer::spawn(vec![Behavior::DelayRespond(
            Duration::from_millis(150),
            200,
            "slow".to_string(),
        )]);
        let client = HttpClient::with_timeouts(Duration::from_millis(200), Duration::from_millis(20));
        let err = client
            .get_text(&server.url("/"))
            .expect_err("read timeout should fail");
        assert!(matches!(err, FetchError::Transport(_)), "unexpected: {err:?}");
        assert!(err.user_message().contains("transport error"));
    }

    #[test]
    fn post_sends_json_content_type_and_body() {
        let server = TestServer::spawn(vec![Behavior::Respond(
            200,
            r#"{"name":"-N1"}"#.to_string(),
        )]);
        let body = quick_client()
            .post_json(&server.url("/movies.json"), r#"{"title":"T"}"#)
            .expect("post should succeed");
        assert_eq!(body, r#"{"name":"-N1"}"#);

        let request = &server.requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(
            request.header("content-type").as_deref(),
            Some("application/json")
        );
        assert_eq!(request.body, r#"{"title":"T"}"#);
    }

    #[test]
    fn delete_uses_delete_method() {
        let server = TestServer::spawn(vec![Behavior::Respond(200, "null".to_string())]);
        quick_client()
            .delete(&server.url("/movies/-N1.json"))
            .expect("delete should succeed");
        let request = &server.requests()[0];
        assert_eq!(request.method, "DELETE");
        assert_eq!(request.path, "/movies/-N1.json");
    }

    #[test]
    fn unsupported_is_not_retryable() {
        let err = FetchError::Unsupported {
            operation: "delete",
            backend: "films",
        };
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "delete is not supported by the films source");
    }

    #[test]
    fn invalid_id_is_reported_verbatim_and_not_retryable() {
        let err = FetchError::InvalidId {
            id: "a/b".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "invalid movie id 'a/b'");
    }
}
