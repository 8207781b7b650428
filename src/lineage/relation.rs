//! Raw lineage relations as returned by the lineage endpoint

use serde::{Deserialize, Serialize};

/// One edge between two entities in a lineage response
///
/// When the request hid process nodes, each relation links two data assets
/// through the process that connects them (`processId`). Otherwise the
/// relation is a plain relationship hop (`relationshipId`) and cannot be
/// used to build a [`LineageGraph`](super::LineageGraph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageRelation {
    pub from_entity_id: String,
    pub to_entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_id: Option<String>,
}

impl LineageRelation {
    /// A relation that passes through a process
    pub fn through_process(
        from: impl Into<String>,
        to: impl Into<String>,
        process: impl Into<String>,
    ) -> Self {
        Self {
            from_entity_id: from.into(),
            to_entity_id: to.into(),
            process_id: Some(process.into()),
            relationship_id: None,
        }
    }

    /// A relation expressed as a relationship hop
    pub fn through_relationship(
        from: impl Into<String>,
        to: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            from_entity_id: from.into(),
            to_entity_id: to.into(),
            process_id: None,
            relationship_id: Some(relationship.into()),
        }
    }

    /// Whether this relation can be placed in a lineage graph
    pub fn is_full_link(&self) -> bool {
        self.process_id.is_some()
    }
}
