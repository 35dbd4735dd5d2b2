//! GROQ queries and response decoding for a Sanity-hosted catalog.
//!
//! The HTTP round-trip lives with the platform; this module only knows the
//! query text, the endpoint shape and the `{ "result": ... }` envelope.

use super::ContentItem;
use crate::error::LookupError;
use serde::{Deserialize, Serialize};

const POEM_PROJECTION: &str = r#"{ id, title, "slug": slug.current, content, symbol, theme, audioAmbienceUrl }"#;

pub fn all_poems_query() -> String {
    format!(r#"*[_type == "poem"] {POEM_PROJECTION}"#)
}

pub fn poem_by_slug_query() -> String {
    format!(r#"*[_type == "poem" && slug.current == $slug][0] {POEM_PROJECTION}"#)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanityProject {
    pub project_id: String,
    pub dataset: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_use_cdn")]
    pub use_cdn: bool,
}

fn default_api_version() -> String {
    "2021-10-21".to_owned()
}

fn default_use_cdn() -> bool {
    true
}

impl SanityProject {
    /// Query endpoint without the query string.
    pub fn query_endpoint(&self) -> String {
        let host = if self.use_cdn { "apicdn" } else { "api" };
        format!(
            "https://{}.{}.sanity.io/v{}/data/query/{}",
            self.project_id, host, self.api_version, self.dataset
        )
    }
}

/// Query parameters are sent JSON-encoded (`$slug="..."`).
pub fn encode_param(value: &str) -> Result<String, LookupError> {
    Ok(serde_json::to_string(value)?)
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

pub fn decode_all(body: &str) -> Result<Vec<ContentItem>, LookupError> {
    let envelope: QueryResponse<Option<Vec<ContentItem>>> = serde_json::from_str(body)?;
    Ok(envelope.result.unwrap_or_default())
}

pub fn decode_one(body: &str) -> Result<Option<ContentItem>, LookupError> {
    let envelope: QueryResponse<Option<ContentItem>> = serde_json::from_str(body)?;
    Ok(envelope.result)
}
