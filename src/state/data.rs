//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the network layer and the UI layer.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One random dog as returned by the API
///
/// Immutable once received. The view model replaces it wholesale on every
/// successful fetch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DogObject {
    /// Where to download the picture from
    #[serde(rename = "imgUrl", alias = "url", alias = "message")]
    pub img_url: String,
    /// Caption paired with the picture (empty if the API sends none)
    #[serde(default, alias = "caption")]
    pub phrase: String,
    /// Anything else the API sent along
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl DogObject {
    /// Build a dog with no extra metadata
    #[cfg(test)]
    pub fn new(img_url: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            img_url: img_url.into(),
            phrase: phrase.into(),
            metadata: Map::new(),
        }
    }

    /// Check that `img_url` is an absolute http(s) URL
    pub fn has_valid_url(&self) -> bool {
        match reqwest::Url::parse(&self.img_url) {
            Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
            Err(_) => false,
        }
    }
}
