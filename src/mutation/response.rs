//! Bulk mutation responses
//!
//! A bulk save returns the assets it touched bucketed by what happened to them,
//! plus the server GUID assigned to each placeholder GUID the client sent.
//! [`AssetMutationResponse`] correlates the objects the caller submitted with
//! those buckets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::asset::{sublist, Asset, AssetKind};
use crate::guid;

/// What a bulk mutation did to one submitted asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationType {
    Created,
    Updated,
    Deleted,
    /// Submitted, but the server found nothing to change
    Noop,
    /// The submitted asset could not be matched to any server GUID
    Unknown,
}

/// Assets touched by a mutation, by bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutatedAssets {
    #[serde(rename = "CREATE", default, skip_serializing_if = "Option::is_none")]
    pub create: Option<Vec<Asset>>,

    #[serde(rename = "UPDATE", default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Vec<Asset>>,

    #[serde(rename = "PARTIAL_UPDATE", default, skip_serializing_if = "Option::is_none")]
    pub partial_update: Option<Vec<Asset>>,

    #[serde(rename = "DELETE", default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Vec<Asset>>,
}

/// Response to a bulk create, update or delete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMutationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutated_entities: Option<MutatedAssets>,

    /// Placeholder GUID -> server GUID
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub guid_assignments: HashMap<String, String>,
}

fn bucket(list: Option<&Vec<Asset>>) -> &[Asset] {
    list.map(Vec::as_slice).unwrap_or(&[])
}

impl AssetMutationResponse {
    fn buckets(&self) -> Option<&MutatedAssets> {
        self.mutated_entities.as_ref()
    }

    pub fn created_assets(&self) -> &[Asset] {
        bucket(self.buckets().and_then(|m| m.create.as_ref()))
    }

    pub fn updated_assets(&self) -> &[Asset] {
        bucket(self.buckets().and_then(|m| m.update.as_ref()))
    }

    pub fn partially_updated_assets(&self) -> &[Asset] {
        bucket(self.buckets().and_then(|m| m.partial_update.as_ref()))
    }

    pub fn deleted_assets(&self) -> &[Asset] {
        bucket(self.buckets().and_then(|m| m.delete.as_ref()))
    }

    pub fn created_assets_of(&self, kind: &AssetKind) -> Vec<&Asset> {
        sublist(self.created_assets(), kind)
    }

    pub fn updated_assets_of(&self, kind: &AssetKind) -> Vec<&Asset> {
        sublist(self.updated_assets(), kind)
    }

    pub fn partially_updated_assets_of(&self, kind: &AssetKind) -> Vec<&Asset> {
        sublist(self.partially_updated_assets(), kind)
    }

    pub fn deleted_assets_of(&self, kind: &AssetKind) -> Vec<&Asset> {
        sublist(self.deleted_assets(), kind)
    }

    /// Whether the server reported touching nothing at all
    pub fn is_empty(&self) -> bool {
        self.created_assets().is_empty()
            && self.updated_assets().is_empty()
            && self.partially_updated_assets().is_empty()
            && self.deleted_assets().is_empty()
    }

    /// Server GUID for a submitted asset
    ///
    /// An assignment for the asset's GUID wins over the GUID itself, even when
    /// the submitted GUID already looks server-issued.
    pub fn assigned_guid<'a>(&'a self, asset: &'a Asset) -> Option<&'a str> {
        self.resolve_guid(&asset.guid)
    }

    fn resolve_guid<'a>(&'a self, submitted: &'a str) -> Option<&'a str> {
        if let Some(assigned) = self.guid_assignments.get(submitted) {
            return Some(assigned.as_str());
        }
        if guid::is_resolved_guid(submitted) {
            return Some(submitted);
        }
        None
    }

    /// What the mutation did to a submitted asset
    pub fn mutation_type(&self, asset: &Asset) -> MutationType {
        self.mutation_type_of_guid(&asset.guid)
    }

    /// What the mutation did to the asset submitted with this GUID
    pub fn mutation_type_of_guid(&self, submitted: &str) -> MutationType {
        let Some(resolved) = self.resolve_guid(submitted) else {
            return MutationType::Unknown;
        };
        let contains = |list: &[Asset]| list.iter().any(|a| a.guid == resolved);

        if contains(self.created_assets()) {
            MutationType::Created
        } else if contains(self.updated_assets()) || contains(self.partially_updated_assets()) {
            MutationType::Updated
        } else if contains(self.deleted_assets()) {
            MutationType::Deleted
        } else {
            MutationType::Noop
        }
    }

    /// The asset the server returned for a submitted asset, if any
    pub fn result_for(&self, asset: &Asset) -> Option<&Asset> {
        let resolved = self.resolve_guid(&asset.guid)?;
        self.created_assets()
            .iter()
            .chain(self.updated_assets())
            .chain(self.partially_updated_assets())
            .chain(self.deleted_assets())
            .find(|a| a.guid == resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REAL1: &str = "11111111-1111-4111-8111-111111111111";
    const REAL2: &str = "22222222-2222-4222-8222-222222222222";
    const REAL3: &str = "33333333-3333-4333-8333-333333333333";

    fn table(guid: &str) -> Asset {
        Asset::reference(AssetKind::Table, guid)
    }

    fn response(buckets: MutatedAssets, assignments: &[(&str, &str)]) -> AssetMutationResponse {
        AssetMutationResponse {
            mutated_entities: Some(buckets),
            guid_assignments: assignments
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_created_via_placeholder_and_real_guid() {
        let resp = response(
            MutatedAssets { create: Some(vec![table(REAL1)]), ..Default::default() },
            &[("ph1", REAL1)],
        );
        assert_eq!(resp.mutation_type(&table("ph1")), MutationType::Created);
        assert_eq!(resp.mutation_type(&table(REAL1)), MutationType::Created);
        assert_eq!(resp.mutation_type(&table("ph-other")), MutationType::Unknown);
    }

    #[test]
    fn test_noop_when_assigned_but_untouched() {
        let resp = response(MutatedAssets::default(), &[("ph2", REAL2)]);
        assert_eq!(resp.mutation_type(&table("ph2")), MutationType::Noop);
        assert!(resp.result_for(&table("ph2")).is_none());
    }

    #[test]
    fn test_update_and_partial_update_both_classify_as_updated() {
        let resp = response(
            MutatedAssets {
                update: Some(vec![table(REAL1)]),
                partial_update: Some(vec![table(REAL2)]),
                delete: Some(vec![table(REAL3)]),
                ..Default::default()
            },
            &[],
        );
        assert_eq!(resp.mutation_type(&table(REAL1)), MutationType::Updated);
        assert_eq!(resp.mutation_type(&table(REAL2)), MutationType::Updated);
        assert_eq!(resp.mutation_type(&table(REAL3)), MutationType::Deleted);
    }

    #[test]
    fn test_created_wins_over_other_buckets() {
        let resp = response(
            MutatedAssets {
                create: Some(vec![table(REAL1)]),
                update: Some(vec![table(REAL1)]),
                ..Default::default()
            },
            &[],
        );
        assert_eq!(resp.mutation_type(&table(REAL1)), MutationType::Created);
    }

    #[test]
    fn test_assignment_wins_over_resolved_looking_guid() {
        let resp = response(
            MutatedAssets { update: Some(vec![table(REAL2)]), ..Default::default() },
            &[(REAL1, REAL2)],
        );
        assert_eq!(resp.assigned_guid(&table(REAL1)), Some(REAL2));
        assert_eq!(resp.mutation_type(&table(REAL1)), MutationType::Updated);
    }

    #[test]
    fn test_result_for() {
        let mut created = table(REAL1);
        created.display_text = Some("orders".into());
        let resp = response(
            MutatedAssets {
                create: Some(vec![created]),
                delete: Some(vec![table(REAL3)]),
                ..Default::default()
            },
            &[("-1", REAL1)],
        );
        let found = resp.result_for(&table("-1")).unwrap();
        assert_eq!(found.display_text.as_deref(), Some("orders"));
        assert_eq!(resp.result_for(&table(REAL3)).unwrap().guid, REAL3);
        assert!(resp.result_for(&table("")).is_none());
        assert!(resp.result_for(&table("unknown")).is_none());
    }

    #[test]
    fn test_sublists_never_null() {
        let empty = AssetMutationResponse::default();
        assert!(empty.created_assets().is_empty());
        assert!(empty.deleted_assets_of(&AssetKind::Table).is_empty());
        assert!(empty.is_empty());

        let resp = response(
            MutatedAssets {
                create: Some(vec![
                    table(REAL1),
                    Asset::reference(AssetKind::GlossaryTerm, REAL2),
                    table(REAL3),
                ]),
                ..Default::default()
            },
            &[],
        );
        let tables: Vec<_> = resp
            .created_assets_of(&AssetKind::Table)
            .into_iter()
            .map(|a| a.guid.as_str())
            .collect();
        assert_eq!(tables, vec![REAL1, REAL3]);
        assert!(resp.created_assets_of(&AssetKind::Column).is_empty());
        assert!(resp.updated_assets_of(&AssetKind::Table).is_empty());
    }

    #[test]
    fn test_wire_format() {
        let json = format!(
            r#"{{
                "mutatedEntities": {{
                    "CREATE": [{{"typeName": "Table", "guid": "{REAL1}"}}],
                    "PARTIAL_UPDATE": [{{"typeName": "Column", "guid": "{REAL2}"}}]
                }},
                "guidAssignments": {{"-100": "{REAL1}"}}
            }}"#
        );
        let resp: AssetMutationResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(resp.created_assets().len(), 1);
        assert_eq!(resp.partially_updated_assets()[0].kind(), AssetKind::Column);
        assert!(resp.updated_assets().is_empty());
        assert_eq!(resp.mutation_type_of_guid("-100"), MutationType::Created);

        let back = serde_json::to_value(&resp).unwrap();
        assert!(back["mutatedEntities"].get("UPDATE").is_none());
        assert_eq!(back["guidAssignments"]["-100"], REAL1);
    }
}
