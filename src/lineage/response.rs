//! Lineage response and graph-backed queries

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

use super::{LineageDirection, LineageGraph, LineageRelation};
use crate::asset::Asset;
use crate::error::Result;

/// Response from the lineage endpoint
///
/// Graph queries build a [`LineageGraph`] from `relations` on first use and
/// reuse it afterwards. They only work for responses fetched with process
/// nodes hidden; otherwise every graph query fails with
/// [`AtlanError::GraphPrecondition`](crate::AtlanError::GraphPrecondition).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageResponse {
    /// GUID of the asset lineage was requested for
    #[serde(default)]
    pub base_entity_guid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_direction: Option<LineageDirection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_depth: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,

    #[serde(default)]
    pub has_more_upstream_vertices: bool,

    #[serde(default)]
    pub has_more_downstream_vertices: bool,

    /// Details of every asset that appears in the lineage
    #[serde(default)]
    pub guid_entity_map: HashMap<String, Asset>,

    #[serde(default)]
    pub relations: Vec<LineageRelation>,

    #[serde(skip)]
    graph: OnceLock<LineageGraph>,
}

impl LineageResponse {
    /// Response over an explicit set of relations and asset details
    pub fn new(
        base_entity_guid: impl Into<String>,
        relations: Vec<LineageRelation>,
        guid_entity_map: HashMap<String, Asset>,
    ) -> Self {
        Self {
            base_entity_guid: base_entity_guid.into(),
            relations,
            guid_entity_map,
            ..Default::default()
        }
    }

    /// The lineage graph, built on first call
    pub fn graph(&self) -> Result<&LineageGraph> {
        if let Some(graph) = self.graph.get() {
            return Ok(graph);
        }
        let built = LineageGraph::build(&self.relations)?;
        Ok(self.graph.get_or_init(|| built))
    }

    fn hydrate<'a, S: AsRef<str>>(&'a self, guids: impl IntoIterator<Item = S>) -> Vec<&'a Asset> {
        guids
            .into_iter()
            .filter_map(|g| self.guid_entity_map.get(g.as_ref()))
            .collect()
    }

    // ========== Downstream ==========

    pub fn downstream_guids(&self) -> Result<Vec<&str>> {
        self.downstream_guids_of(&self.base_entity_guid)
    }

    pub fn downstream_guids_of(&self, guid: &str) -> Result<Vec<&str>> {
        Ok(self.graph()?.downstream_entity_ids(guid))
    }

    pub fn downstream_process_guids(&self) -> Result<Vec<&str>> {
        self.downstream_process_guids_of(&self.base_entity_guid)
    }

    pub fn downstream_process_guids_of(&self, guid: &str) -> Result<Vec<&str>> {
        Ok(self.graph()?.downstream_process_ids(guid))
    }

    /// Assets immediately downstream, skipping any without details in the response
    pub fn downstream_assets(&self) -> Result<Vec<&Asset>> {
        self.downstream_assets_of(&self.base_entity_guid)
    }

    pub fn downstream_assets_of(&self, guid: &str) -> Result<Vec<&Asset>> {
        Ok(self.hydrate(self.downstream_guids_of(guid)?))
    }

    pub fn all_downstream_guids_dfs(&self) -> Result<Vec<String>> {
        self.all_downstream_guids_dfs_of(&self.base_entity_guid)
    }

    pub fn all_downstream_guids_dfs_of(&self, guid: &str) -> Result<Vec<String>> {
        Ok(self.graph()?.all_downstream_entity_ids_dfs(guid))
    }

    pub fn all_downstream_assets_dfs(&self) -> Result<Vec<&Asset>> {
        self.all_downstream_assets_dfs_of(&self.base_entity_guid)
    }

    pub fn all_downstream_assets_dfs_of(&self, guid: &str) -> Result<Vec<&Asset>> {
        Ok(self.hydrate(self.all_downstream_guids_dfs_of(guid)?))
    }

    // ========== Upstream ==========

    pub fn upstream_guids(&self) -> Result<Vec<&str>> {
        self.upstream_guids_of(&self.base_entity_guid)
    }

    pub fn upstream_guids_of(&self, guid: &str) -> Result<Vec<&str>> {
        Ok(self.graph()?.upstream_entity_ids(guid))
    }

    pub fn upstream_process_guids(&self) -> Result<Vec<&str>> {
        self.upstream_process_guids_of(&self.base_entity_guid)
    }

    pub fn upstream_process_guids_of(&self, guid: &str) -> Result<Vec<&str>> {
        Ok(self.graph()?.upstream_process_ids(guid))
    }

    /// Assets immediately upstream, skipping any without details in the response
    pub fn upstream_assets(&self) -> Result<Vec<&Asset>> {
        self.upstream_assets_of(&self.base_entity_guid)
    }

    pub fn upstream_assets_of(&self, guid: &str) -> Result<Vec<&Asset>> {
        Ok(self.hydrate(self.upstream_guids_of(guid)?))
    }

    pub fn all_upstream_guids_dfs(&self) -> Result<Vec<String>> {
        self.all_upstream_guids_dfs_of(&self.base_entity_guid)
    }

    pub fn all_upstream_guids_dfs_of(&self, guid: &str) -> Result<Vec<String>> {
        Ok(self.graph()?.all_upstream_entity_ids_dfs(guid))
    }

    pub fn all_upstream_assets_dfs(&self) -> Result<Vec<&Asset>> {
        self.all_upstream_assets_dfs_of(&self.base_entity_guid)
    }

    pub fn all_upstream_assets_dfs_of(&self, guid: &str) -> Result<Vec<&Asset>> {
        Ok(self.hydrate(self.all_upstream_guids_dfs_of(guid)?))
    }
}
