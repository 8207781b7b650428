//! Lineage request

use serde::{Deserialize, Serialize};

use super::LineageResponse;
use crate::client::LineageTransport;
use crate::error::{AtlanError, Result};
use crate::guid;

/// Which way to walk lineage from the starting asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineageDirection {
    /// Upstream
    Input,
    /// Downstream
    Output,
    #[default]
    Both,
}

fn default_depth() -> u32 {
    1_000_000
}

fn default_true() -> bool {
    true
}

/// Request for the lineage of a single asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageRequest {
    /// GUID of the starting asset
    pub guid: String,

    /// Number of hops to include
    #[serde(default = "default_depth")]
    pub depth: u32,

    #[serde(default)]
    pub direction: LineageDirection,

    /// Collapse processes into the relations between data assets.
    /// Must stay `true` for graph traversal of the response.
    #[serde(default = "default_true")]
    pub hide_process: bool,

    #[serde(default)]
    pub allow_deleted_process: bool,

    /// Extra attributes to return for each asset in `guidEntityMap`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl LineageRequest {
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            depth: default_depth(),
            direction: LineageDirection::default(),
            hide_process: true,
            allow_deleted_process: false,
            attributes: Vec::new(),
        }
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn direction(mut self, direction: LineageDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn hide_process(mut self, hide: bool) -> Self {
        self.hide_process = hide;
        self
    }

    pub fn allow_deleted_process(mut self, allow: bool) -> Self {
        self.allow_deleted_process = allow;
        self
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Reject requests the server would refuse anyway
    pub fn validate(&self) -> Result<()> {
        if !guid::is_resolved_guid(&self.guid) {
            return Err(AtlanError::InvalidRequest(format!(
                "lineage requires a server-issued GUID, got '{}'",
                self.guid
            )));
        }
        if self.depth == 0 {
            return Err(AtlanError::InvalidRequest("depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Send the request
    pub fn fetch(&self, transport: &impl LineageTransport) -> Result<LineageResponse> {
        self.validate()?;
        tracing::debug!(guid = %self.guid, depth = self.depth, direction = ?self.direction, "fetching lineage");
        transport.get_lineage(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUID: &str = "b4113341-251b-4adc-81fb-2420501c30e6";

    #[test]
    fn test_defaults_serialize_with_wire_names() {
        let req = LineageRequest::new(GUID);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["guid"], GUID);
        assert_eq!(json["depth"], 1_000_000);
        assert_eq!(json["direction"], "BOTH");
        assert_eq!(json["hideProcess"], true);
        assert_eq!(json["allowDeletedProcess"], false);
        assert!(json.get("attributes").is_none());
    }

    #[test]
    fn test_builder() {
        let req = LineageRequest::new(GUID)
            .depth(3)
            .direction(LineageDirection::Output)
            .attribute("certificateStatus");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["direction"], "OUTPUT");
        assert_eq!(json["attributes"][0], "certificateStatus");
    }

    #[test]
    fn test_validate() {
        assert!(LineageRequest::new(GUID).validate().is_ok());
        assert!(LineageRequest::new("-123").validate().is_err());
        assert!(LineageRequest::new(GUID).depth(0).validate().is_err());
    }
}
