//! Transport
//!
//! The lineage and mutation code talks to the platform only through the small
//! traits below. [`AtlanClient`] implements all of them over HTTP.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::asset::Asset;
use crate::config::AtlanConfig;
use crate::error::{AtlanError, Result};
use crate::lineage::{LineageRequest, LineageResponse};
use crate::mutation::{AssetDeletionResponse, AssetMutationResponse};
use crate::retry::{CancelHandle, InterruptibleSleeper, Poller};

/// State of a background task on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Complete,
    Failed,
}

/// How thoroughly to delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteType {
    /// Archive: the asset remains with status DELETED
    #[default]
    Soft,
    Hard,
    /// Remove entirely
    Purge,
}

impl DeleteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteType::Soft => "SOFT",
            DeleteType::Hard => "HARD",
            DeleteType::Purge => "PURGE",
        }
    }
}

/// Fetch a single asset by GUID
pub trait AssetFetcher {
    /// `full` also retrieves relationships and extended info.
    /// A missing asset must surface as [`AtlanError::NotFound`].
    fn get_asset_by_guid(&self, guid: &str, full: bool) -> Result<Asset>;
}

/// Query the background task index
pub trait TaskIndex {
    /// Number of tasks against any of `guids` currently in one of `statuses`
    fn count_tasks(&self, guids: &[String], statuses: &[TaskStatus]) -> Result<u64>;
}

/// Retrieve lineage
pub trait LineageTransport {
    fn get_lineage(&self, request: &LineageRequest) -> Result<LineageResponse>;
}

/// Bulk writes
pub trait AssetMutator {
    fn save(&self, assets: &[Asset]) -> Result<AssetMutationResponse>;
    fn delete(&self, guids: &[String], delete_type: DeleteType) -> Result<AssetDeletionResponse>;
}

const ENTITY_BY_GUID: &str = "/api/meta/entity/guid";
const ENTITY_BULK: &str = "/api/meta/entity/bulk";
const LINEAGE: &str = "/api/meta/lineage/getlineage";
const TASK_SEARCH: &str = "/api/meta/task/search";

#[derive(Deserialize)]
struct EntityWithExtInfo {
    entity: Asset,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskSearchResponse {
    #[serde(default)]
    approximate_count: u64,
}

/// Blocking HTTP client for an Atlan tenant
#[derive(Debug, Clone)]
pub struct AtlanClient {
    http: Client,
    base_url: String,
    poller: Poller,
    async_poller: Poller,
    cancel: CancelHandle,
}

impl AtlanClient {
    pub fn new(config: &AtlanConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.client.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AtlanError::InvalidRequest(format!("invalid API token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.client.timeout_secs))
            .build()?;

        let sleeper = InterruptibleSleeper::new();
        let cancel = sleeper.handle();
        let sleeper = Arc::new(sleeper);
        let backoff = config.retry.backoff();

        Ok(Self {
            http,
            base_url: config.client.base_url.trim_end_matches('/').to_string(),
            poller: Poller::new(backoff.clone(), config.retry.max_network_retries, sleeper.clone()),
            async_poller: Poller::new(backoff, config.retry.async_max_retries, sleeper),
            cancel,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Poller bounded by the network retry ceiling
    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    /// Poller bounded by the asynchronous-confirmation ceiling
    pub fn async_poller(&self) -> &Poller {
        &self.async_poller
    }

    /// Handle that interrupts the blocking wait in progress on this client
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Delete assets and wait until the deletion is visible everywhere
    pub fn delete_and_block(
        &self,
        guids: &[String],
        delete_type: DeleteType,
    ) -> Result<AssetDeletionResponse> {
        self.cancel.reset();
        let response = self.delete(guids, delete_type)?;
        response.block(self, &self.poller)?;
        Ok(response)
    }

    /// Wait for background tasks against these assets to finish
    pub fn await_background_tasks(&self, guids: &[String]) -> Result<()> {
        self.cancel.reset();
        AssetDeletionResponse::block_for_background_tasks(self, guids, &self.async_poller)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_default();
        Err(AtlanError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// A 404 from the entity endpoint means the asset itself is gone
fn asset_not_found(guid: &str, err: AtlanError) -> AtlanError {
    match err {
        AtlanError::Api { status: 404, .. } => AtlanError::NotFound {
            guid: guid.to_string(),
        },
        other => other,
    }
}

impl AssetFetcher for AtlanClient {
    fn get_asset_by_guid(&self, guid: &str, full: bool) -> Result<Asset> {
        let minimal = (!full).to_string();
        let request = self
            .http
            .get(self.url(&format!("{}/{}", ENTITY_BY_GUID, guid)))
            .query(&[("minExtInfo", minimal.as_str()), ("ignoreRelationships", minimal.as_str())]);
        let body: EntityWithExtInfo = self
            .send(request)
            .map_err(|e| asset_not_found(guid, e))?
            .json()?;
        Ok(body.entity)
    }
}

impl TaskIndex for AtlanClient {
    fn count_tasks(&self, guids: &[String], statuses: &[TaskStatus]) -> Result<u64> {
        let body = json!({
            "dsl": {
                "from": 0,
                "size": 0,
                "query": {
                    "bool": {
                        "filter": [
                            { "terms": { "__task_entityGuid": guids } },
                            { "terms": { "__task_status": statuses } }
                        ]
                    }
                }
            }
        });
        let request = self.http.post(self.url(TASK_SEARCH)).json(&body);
        let response: TaskSearchResponse = self.send(request)?.json()?;
        Ok(response.approximate_count)
    }
}

impl LineageTransport for AtlanClient {
    fn get_lineage(&self, request: &LineageRequest) -> Result<LineageResponse> {
        let http_request = self.http.post(self.url(LINEAGE)).json(request);
        Ok(self.send(http_request)?.json()?)
    }
}

impl AssetMutator for AtlanClient {
    fn save(&self, assets: &[Asset]) -> Result<AssetMutationResponse> {
        if assets.is_empty() {
            return Ok(AssetMutationResponse::default());
        }
        let request = self
            .http
            .post(self.url(ENTITY_BULK))
            .query(&[("replaceClassifications", "false"), ("replaceBusinessAttributes", "false")])
            .json(&json!({ "entities": assets }));
        let response: AssetMutationResponse = self.send(request)?.json()?;
        tracing::info!(
            created = response.created_assets().len(),
            updated = response.updated_assets().len() + response.partially_updated_assets().len(),
            "saved assets"
        );
        Ok(response)
    }

    fn delete(&self, guids: &[String], delete_type: DeleteType) -> Result<AssetDeletionResponse> {
        if guids.is_empty() {
            return Ok(AssetDeletionResponse::default());
        }
        let mut params: Vec<(&str, &str)> = guids.iter().map(|g| ("guid", g.as_str())).collect();
        params.push(("deleteType", delete_type.as_str()));
        let request = self.http.delete(self.url(ENTITY_BULK)).query(&params);
        let response: AssetDeletionResponse = self.send(request)?.json()?;
        tracing::info!(deleted = response.deleted_assets().len(), delete_type = delete_type.as_str(), "deleted assets");
        Ok(response)
    }
}
