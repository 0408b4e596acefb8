use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, Response};
use url::Url;

use super::store_trait::FlowStore;
use crate::error_handling::types::QueryError;
use crate::filter_state::FlowQuery;
use crate::flow::{Flow, Service};

/// Client for a remote flow store speaking JSON over HTTP.
///
/// Endpoints, relative to `base_url`:
/// - `POST query` with a [`FlowQuery`] body, answering `[Flow]`
/// - `GET tags`, answering `[String]`
/// - `GET services`, answering `[Service]`
///
/// Every request is bounded by the configured timeout, reported as
/// [`QueryError::Timeout`].
pub struct HttpFlowStore {
    client: Client,
    base_url: Url,
}

impl HttpFlowStore {
    pub fn new(mut base_url: Url, timeout: Duration) -> Result<Self, QueryError> {
        // `Url::join` drops the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            QueryError::Unavailable(e.to_string())
        })?;
        info!("HttpFlowStore targeting {} (timeout {:?})", base_url, timeout);
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, QueryError> {
        self.base_url
            .join(path)
            .map_err(|e| QueryError::Unavailable(format!("bad endpoint {}: {}", path, e)))
    }

    async fn check(response: Response) -> Result<Response, QueryError> {
        let status = response.status();
        if !status.is_success() {
            error!("Flow store answered {} for {}", status, response.url());
            return Err(QueryError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl FlowStore for HttpFlowStore {
    async fn query(&self, query: &FlowQuery) -> Result<Vec<Flow>, QueryError> {
        let url = self.endpoint("query")?;
        debug!("POST {} {:?}", url, query);
        let response = self.client.post(url).json(query).send().await?;
        let flows: Vec<Flow> = Self::check(response).await?.json().await?;
        debug!("Flow store returned {} flow(s)", flows.len());
        Ok(flows)
    }

    async fn tags(&self) -> Result<Vec<String>, QueryError> {
        let url = self.endpoint("tags")?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn services(&self) -> Result<Vec<Service>, QueryError> {
        let url = self.endpoint("services")?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
