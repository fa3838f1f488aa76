use std::time::Duration;

use reqwest::StatusCode;

use super::models::{DemandLetterRequest, GenerationResponse};
use super::ServiceError;

const GENERATE_PATH: &str = "/demand/generate-demand-letter";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Thin JSON client for the generation endpoint.
pub struct LetterClient {
    base_url: String,
    client: reqwest::Client,
}

impl LetterClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), GENERATE_PATH)
    }

    /// Validates the request, posts it, and decodes the service reply.
    ///
    /// A reply with `success: false` is returned as-is; callers decide how to
    /// surface it. Non-JSON error statuses become [`ServiceError::Rejected`].
    pub async fn generate(
        &self,
        request: DemandLetterRequest,
    ) -> Result<GenerationResponse, ServiceError> {
        let request = request.validated()?;
        let url = self.endpoint();
        tracing::debug!(%url, deadline_days = request.deadline_days, "requesting demand letter");

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

fn decode_response(status: StatusCode, body: &str) -> Result<GenerationResponse, ServiceError> {
    match serde_json::from_str::<GenerationResponse>(body) {
        Ok(parsed) => Ok(parsed),
        Err(_) if !status.is_success() => Err(rejected(status, body)),
        Err(err) => Err(ServiceError::Decode(err.to_string())),
    }
}

fn rejected(status: StatusCode, body: &str) -> ServiceError {
    let detail = body.trim();
    if detail.is_empty() {
        ServiceError::Rejected(format!("HTTP {status}"))
    } else {
        ServiceError::Rejected(format!("HTTP {status}: {detail}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        let client = LetterClient::new("http://localhost:8000/").unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8000/demand/generate-demand-letter"
        );
    }

    #[test]
    fn rejected_includes_status_and_body() {
        let err = rejected(StatusCode::BAD_GATEWAY, " upstream down ");
        assert_eq!(
            err.to_string(),
            "letter generation failed: HTTP 502 Bad Gateway: upstream down"
        );
        assert!(matches!(
            rejected(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ServiceError::Rejected(msg) if msg == "HTTP 500 Internal Server Error"
        ));
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let err = decode_response(StatusCode::OK, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[test]
    fn error_status_with_json_body_is_still_decoded() {
        let response = decode_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"success": false, "error": "bad date"}"#,
        )
        .unwrap();

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("bad date"));
        assert!(matches!(
            decode_response(StatusCode::BAD_GATEWAY, "upstream down"),
            Err(ServiceError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_network() {
        // Port 9 is discard; validation must fail before any connect attempt.
        let client = LetterClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .generate(DemandLetterRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }
}
