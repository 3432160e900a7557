//! Remote fetcher for the random dog API

use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;
use crate::state::data::DogObject;

/// Anything that can hand out a random dog.
///
/// Implementations never touch the UI; the caller decides how to report
/// failures.
#[async_trait]
pub trait DogSource: Send + Sync {
    async fn fetch_random_dog(&self) -> Result<DogObject, FetchError>;
}

/// `DogSource` backed by an HTTP GET against the configured endpoint
#[derive(Debug, Clone)]
pub struct ReqwestDogSource {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestDogSource {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DogSource for ReqwestDogSource {
    async fn fetch_random_dog(&self) -> Result<DogObject, FetchError> {
        debug!(endpoint = %self.endpoint, "requesting a new dog");

        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Read the body first so a bad payload reports as a parse error
        // rather than a transport one
        let body = response.bytes().await?;
        let dog: DogObject =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        if !dog.has_valid_url() {
            return Err(FetchError::InvalidUrl(dog.img_url));
        }

        debug!(url = %dog.img_url, "dog received");
        Ok(dog)
    }
}
