use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{HttpFailure, StoreClientError};

/// Shared HTTP plumbing: one connection pool and the API base URL, which
/// already includes the `/api` prefix.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Arc<Client>,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|err| StoreClientError::Config(format!("invalid API URL {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreClientError::Config(format!(
                "API URL {base_url} cannot have a path"
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreClientError::Config(format!("API URL {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    pub fn delete(&self, url: Url) -> RequestBuilder {
        self.client.delete(url)
    }

    /// Sends the request and decodes a JSON body on success.
    pub async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, StoreClientError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "response received");

        if status.is_success() {
            let body = response.bytes().await?;
            serde_json::from_slice(&body)
                .map_err(|err| StoreClientError::InvalidRecord(err.to_string()))
        } else {
            Err(HttpFailure::from_response(response).await.into())
        }
    }

    /// Like [`ApiClient::send`], for endpoints whose body is irrelevant.
    pub async fn send_empty(request: RequestBuilder) -> Result<(), StoreClientError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "response received");

        if status.is_success() {
            Ok(())
        } else {
            Err(HttpFailure::from_response(response).await.into())
        }
    }
}
