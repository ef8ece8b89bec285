//! Request and response shapes for the Linkup endpoints.
//!
//! Requests serialize to the API's camelCase JSON. Responses are kept as raw
//! bytes (`RawResponse`) so callers decide how to interpret them.

use crate::error::LinkupError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Search depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    #[default]
    Standard,
    Deep,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Standard => "standard",
            Depth::Deep => "deep",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Depth::Standard),
            "deep" => Ok(Depth::Deep),
            other => Err(format!("invalid depth {:?} (expected standard|deep)", other)),
        }
    }
}

/// Shape of the search response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputType {
    SourcedAnswer,
    #[default]
    SearchResults,
    Structured,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::SourcedAnswer => "sourcedAnswer",
            OutputType::SearchResults => "searchResults",
            OutputType::Structured => "structured",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sourcedAnswer" => Ok(OutputType::SourcedAnswer),
            "searchResults" => Ok(OutputType::SearchResults),
            "structured" => Ok(OutputType::Structured),
            other => Err(format!(
                "invalid output type {:?} (expected sourcedAnswer|searchResults|structured)",
                other
            )),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub q: String,
    pub depth: Depth,
    pub output_type: OutputType,
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_images: bool,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_inline_citations: bool,
    /// JSON schema (as a string) for `OutputType::Structured`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_output_schema: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_sources: bool,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }
}

/// Body of `POST /fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_raw_html: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub render_js: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub extract_images: bool,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Response of `GET /credits/balance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub balance: f64,
}

/// A `sourcedAnswer` search response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourcedAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<AnswerSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

/// Exact bytes of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawResponse {
    raw: Vec<u8>,
}

impl RawResponse {
    pub fn new(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    pub fn raw_json(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    /// Decode the payload into a caller-chosen shape.
    pub fn decode_into<T: DeserializeOwned>(&self) -> Result<T, LinkupError> {
        serde_json::from_slice(&self.raw).map_err(LinkupError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_search_request_omits_optional_fields() {
        let req = SearchRequest::new("hello");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({"q": "hello", "depth": "standard", "outputType": "searchResults"})
        );
    }

    #[test]
    fn full_search_request_uses_camel_case() {
        let req = SearchRequest {
            q: "rust".into(),
            depth: Depth::Deep,
            output_type: OutputType::Structured,
            include_images: true,
            from_date: Some("2024-01-01".into()),
            to_date: Some("2024-12-31".into()),
            exclude_domains: vec!["wikipedia.com".into()],
            include_domains: vec!["microsoft.com".into()],
            include_inline_citations: true,
            structured_output_schema: Some(r#"{"type":"object"}"#.into()),
            include_sources: true,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["depth"], "deep");
        assert_eq!(v["outputType"], "structured");
        assert_eq!(v["includeImages"], true);
        assert_eq!(v["fromDate"], "2024-01-01");
        assert_eq!(v["toDate"], "2024-12-31");
        assert_eq!(v["excludeDomains"], json!(["wikipedia.com"]));
        assert_eq!(v["includeDomains"], json!(["microsoft.com"]));
        assert_eq!(v["includeInlineCitations"], true);
        assert_eq!(v["structuredOutputSchema"], r#"{"type":"object"}"#);
        assert_eq!(v["includeSources"], true);
    }

    #[test]
    fn fetch_request_shape() {
        let mut req = FetchRequest::new("https://example.com");
        req.render_js = true;
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({"url": "https://example.com", "renderJs": true}));
    }

    #[test]
    fn enum_parsing() {
        assert_eq!("deep".parse::<Depth>().unwrap(), Depth::Deep);
        assert!("shallow".parse::<Depth>().is_err());
        assert_eq!(
            "sourcedAnswer".parse::<OutputType>().unwrap(),
            OutputType::SourcedAnswer
        );
        assert!("answers".parse::<OutputType>().is_err());
        assert_eq!(OutputType::SearchResults.to_string(), "searchResults");
    }

    #[test]
    fn raw_response_decodes_on_demand() {
        let raw = RawResponse::new(br#"{"answer":"42","sources":[{"title":"Doc","url":"https://example.com"}]}"#.to_vec());
        let answer: SourcedAnswer = raw.decode_into().unwrap();
        assert_eq!(answer.answer, "42");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].snippet, "");
    }

    #[test]
    fn raw_response_decode_error_is_distinct() {
        let raw = RawResponse::new(b"{not-json".to_vec());
        let err = raw.decode_into::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, LinkupError::Decode(_)));
        assert_eq!(raw.raw_json(), b"{not-json");
    }
}
