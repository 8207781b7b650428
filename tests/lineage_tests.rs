//! Lineage Response Tests
//!
//! Graph queries over recorded lineage responses.

use std::collections::HashMap;

use atlan_sdk::{
    Asset, AssetKind, AtlanError, LineageGraph, LineageRelation, LineageRequest, LineageResponse,
    LineageTransport, Result,
};

const ORDERS: &str = "8f1a6c2e-0b1d-4c3e-9a4f-1b2c3d4e5f60";
const ORDERS_CLEAN: &str = "2d7e9f10-3a4b-4c5d-8e6f-7a8b9c0d1e2f";
const ORDERS_DAILY: &str = "5c6d7e8f-9a0b-4c1d-8e2f-3a4b5c6d7e8f";
const EXPORT: &str = "9e8d7c6b-5a49-4382-8716-05f4e3d2c1b0";
const P1: &str = "a1a1a1a1-0000-4000-8000-000000000001";
const P3: &str = "a1a1a1a1-0000-4000-8000-000000000003";
const P4: &str = "a1a1a1a1-0000-4000-8000-000000000004";

fn hidden_process() -> LineageResponse {
    serde_json::from_str(include_str!("fixtures/lineage_hidden_process.json")).unwrap()
}

fn visible_process() -> LineageResponse {
    serde_json::from_str(include_str!("fixtures/lineage_visible_process.json")).unwrap()
}

// =============================================================================
// Immediate neighbours
// =============================================================================

#[test]
fn test_immediate_downstream() {
    let resp = hidden_process();
    assert_eq!(resp.downstream_guids().unwrap(), vec![ORDERS_CLEAN, EXPORT]);
    assert_eq!(resp.downstream_process_guids().unwrap(), vec![P1, P4]);
}

#[test]
fn test_immediate_upstream() {
    let resp = hidden_process();
    assert_eq!(resp.upstream_guids().unwrap(), vec![ORDERS_DAILY]);
    assert_eq!(resp.upstream_process_guids().unwrap(), vec![P3]);
    assert_eq!(resp.upstream_guids_of(ORDERS_DAILY).unwrap(), vec![ORDERS_CLEAN]);
}

#[test]
fn test_unknown_guid_yields_nothing() {
    let resp = hidden_process();
    assert!(resp.downstream_guids_of("not-in-lineage").unwrap().is_empty());
    assert!(resp.upstream_assets_of("not-in-lineage").unwrap().is_empty());
}

#[test]
fn test_hydrated_neighbours_skip_missing_details() {
    let resp = hidden_process();
    let downstream = resp.downstream_assets().unwrap();
    assert_eq!(downstream.len(), 1);
    assert_eq!(downstream[0].kind(), AssetKind::View);
    assert_eq!(downstream[0].name(), Some("ORDERS_CLEAN"));
}

// =============================================================================
// Deep traversal
// =============================================================================

#[test]
fn test_downstream_dfs_through_cycle() {
    let resp = hidden_process();
    assert_eq!(
        resp.all_downstream_guids_dfs().unwrap(),
        vec![ORDERS, EXPORT, ORDERS_CLEAN, ORDERS_DAILY]
    );
}

#[test]
fn test_upstream_dfs_through_cycle() {
    let resp = hidden_process();
    assert_eq!(
        resp.all_upstream_guids_dfs().unwrap(),
        vec![ORDERS, ORDERS_DAILY, ORDERS_CLEAN]
    );
    assert!(resp.graph().unwrap().has_cycles());
}

#[test]
fn test_dfs_assets_are_hydrated() {
    let resp = hidden_process();
    let kinds: Vec<AssetKind> = resp
        .all_downstream_assets_dfs()
        .unwrap()
        .into_iter()
        .map(Asset::kind)
        .collect();
    assert_eq!(kinds, vec![AssetKind::Table, AssetKind::View, AssetKind::MaterialisedView]);
}

#[test]
fn test_queries_are_repeatable() {
    let resp = hidden_process();
    let first = resp.all_downstream_guids_dfs_of(ORDERS_CLEAN).unwrap();
    let second = resp.all_downstream_guids_dfs_of(ORDERS_CLEAN).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![ORDERS_CLEAN, ORDERS_DAILY, ORDERS, EXPORT]);
}

#[test]
fn test_every_relation_is_traversable_both_ways() {
    let resp = hidden_process();
    let graph = resp.graph().unwrap();
    for r in &resp.relations {
        assert!(graph.downstream_entity_ids(&r.from_entity_id).contains(&r.to_entity_id.as_str()));
        assert!(graph.upstream_entity_ids(&r.to_entity_id).contains(&r.from_entity_id.as_str()));
    }
    assert_eq!(graph.edge_count(), resp.relations.len());
}

// =============================================================================
// Process nodes visible
// =============================================================================

#[test]
fn test_visible_processes_cannot_be_graphed() {
    let resp = visible_process();
    assert!(matches!(resp.downstream_guids(), Err(AtlanError::GraphPrecondition(_))));
    assert!(matches!(resp.all_upstream_assets_dfs(), Err(AtlanError::GraphPrecondition(_))));
    assert!(LineageGraph::build(&resp.relations).is_err());
}

// =============================================================================
// Request round trip through a transport
// =============================================================================

struct CannedLineage;

impl LineageTransport for CannedLineage {
    fn get_lineage(&self, request: &LineageRequest) -> Result<LineageResponse> {
        assert!(request.hide_process);
        let relations = vec![LineageRelation::through_process(&request.guid, EXPORT, P4)];
        let mut details = HashMap::new();
        details.insert(EXPORT.to_string(), Asset::reference(AssetKind::Table, EXPORT));
        Ok(LineageResponse::new(request.guid.clone(), relations, details))
    }
}

#[test]
fn test_fetch_through_transport() {
    let resp = LineageRequest::new(ORDERS).depth(1).fetch(&CannedLineage).unwrap();
    assert_eq!(resp.base_entity_guid, ORDERS);
    assert_eq!(resp.downstream_assets().unwrap()[0].guid, EXPORT);
}

#[test]
fn test_fetch_rejects_placeholder_guid() {
    let err = LineageRequest::new("-42").fetch(&CannedLineage).unwrap_err();
    assert!(matches!(err, AtlanError::InvalidRequest(_)));
}
