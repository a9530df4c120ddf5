//! Gemini `generateContent` backend.
//!
//! Sends the extraction prompt with a JSON response schema, optionally
//! grounded with the `google_search` tool, and maps the first candidate's
//! text plus its grounding chunks into a [`CollegeRecord`].

use serde::Deserialize;
use serde_json::json;

use crate::config::ExtractConfig;
use crate::contract::{build_prompt, collect_citations, parse_record, response_schema};
use crate::engine::Extractor;
use crate::error::SearchError;
use crate::http::{build_client, map_transport_error};
use crate::types::{CollegeRecord, SearchItem};

/// Extractor backed by the Gemini API.
pub struct GeminiExtractor {
    api_key: String,
    endpoint: String,
    web_search: bool,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiExtractor")
            .field("endpoint", &self.endpoint)
            .field("web_search", &self.web_search)
            .finish()
    }
}

impl GeminiExtractor {
    /// Create an extractor for `config` authenticated with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the key is blank or the config is
    /// invalid, or [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: &ExtractConfig) -> Result<Self, SearchError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SearchError::Config("API key must not be empty".into()));
        }
        config.validate()?;
        Ok(Self {
            api_key,
            endpoint: config.endpoint(),
            web_search: config.web_search,
            client: build_client(config)?,
        })
    }

    /// Map an HTTP error status to the appropriate [`SearchError`].
    fn map_http_error(status: reqwest::StatusCode, body: &str) -> SearchError {
        let message = extract_error_message(body);
        match status.as_u16() {
            401 | 403 => SearchError::Auth(format!("Gemini rejected the API key: {message}")),
            429 => SearchError::RateLimited(format!("Gemini rate limited: {message}")),
            code => SearchError::Http(format!("Gemini HTTP {code}: {message}")),
        }
    }
}

/// Build the JSON request body for one item.
pub fn build_request(item: &SearchItem, web_search: bool) -> serde_json::Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": build_prompt(item) }],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        },
    });
    if web_search {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("tools".into(), json!([{ "google_search": {} }]));
        }
    }
    body
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

/// Parse a `generateContent` response body into a record for `item`.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body or the candidate text is not
/// valid JSON, or [`SearchError::EmptyResponse`] if there is no candidate
/// text at all.
pub fn parse_response(body: &str, item: &SearchItem) -> Result<CollegeRecord, SearchError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid generateContent body: {e}")))?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| SearchError::EmptyResponse("no candidates returned".into()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(SearchError::EmptyResponse(format!(
            "candidate has no text (finish reason: {reason})"
        )));
    }

    let mut record = parse_record(&text, item)?;
    if let Some(metadata) = candidate.grounding_metadata {
        record.sources = collect_citations(
            metadata
                .grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .map(|web| (web.title.as_deref(), web.uri.as_deref())),
        );
    }
    Ok(record)
}

/// Extract an error message from a Gemini error response body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

impl Extractor for GeminiExtractor {
    async fn extract(&self, item: &SearchItem) -> Result<CollegeRecord, SearchError> {
        tracing::trace!(name = %item.name, state = %item.state, "sending extraction request");

        let body = build_request(item, self.web_search);
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| map_transport_error(&e))?;
        if !status.is_success() {
            return Err(Self::map_http_error(status, &text));
        }

        parse_response(&text, item)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
