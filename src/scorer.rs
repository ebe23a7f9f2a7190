use crate::error::SubmitError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Body posted to the scoring endpoint for one post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub chat_id: String,
    pub business_id: i64,
    pub token: String,
    pub post_text: String,
    pub group_name: String,
    pub page_url: String,
}

/// Scoring verdict. Fields other than `matched` are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub matched: bool,
}

/// The remote classifier deciding whether a post is a lead.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, endpoint: &Url, request: &ScoreRequest)
    -> Result<ScoreResponse, SubmitError>;
}

/// Scores posts over HTTPS with a JSON POST
#[derive(Debug, Clone)]
pub struct HttpScorer {
    client: reqwest::Client,
}

impl HttpScorer {
    /// Builds a scorer; with `timeout` unset requests wait as long as the
    /// transport allows.
    pub fn new(timeout: Option<Duration>) -> Result<Self, SubmitError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn score(
        &self,
        endpoint: &Url,
        request: &ScoreRequest,
    ) -> Result<ScoreResponse, SubmitError> {
        let resp = self
            .client
            .post(endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SubmitError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        parse_response(&body)
    }
}

/// Decodes a scoring response body
pub fn parse_response(body: &str) -> Result<ScoreResponse, SubmitError> {
    serde_json::from_str(body).map_err(|e| SubmitError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_names() {
        let request = ScoreRequest {
            chat_id: "c1".to_string(),
            business_id: 12,
            token: "t".to_string(),
            post_text: "Need a caterer for 40 people next Saturday".to_string(),
            group_name: "Austin Events".to_string(),
            page_url: "https://www.facebook.com/groups/1".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["chatId"], "c1");
        assert_eq!(value["businessId"], 12);
        assert_eq!(value["token"], "t");
        assert_eq!(value["postText"], "Need a caterer for 40 people next Saturday");
        assert_eq!(value["groupName"], "Austin Events");
        assert_eq!(value["pageUrl"], "https://www.facebook.com/groups/1");
    }

    #[test]
    fn test_response_extra_fields_ignored() {
        let resp = parse_response(r#"{"matched":true,"score":0.93,"leadId":"x"}"#).unwrap();
        assert!(resp.matched);
    }

    #[test]
    fn test_non_json_is_decode_error() {
        let err = parse_response("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, SubmitError::Decode(_)));
    }

    #[test]
    fn test_missing_matched_is_decode_error() {
        assert!(matches!(parse_response("{}"), Err(SubmitError::Decode(_))));
    }
}
