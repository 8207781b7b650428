//! Asset representation
//!
//! Assets travel over the wire as entity headers keyed by `typeName`. Rather than
//! one struct per platform type, every asset is an [`Asset`] whose [`AssetKind`]
//! is derived from its `typeName`. The kind set is closed; anything the client
//! does not model explicitly becomes [`AssetKind::Other`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::guid;

/// Lifecycle status of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    Deleted,
    Purged,
    #[serde(other)]
    Unknown,
}

/// Asset types known to the client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetKind {
    // Abstract supertypes, only useful as filters
    Referenceable,
    Asset,
    Catalog,
    Sql,

    // Concrete types
    Connection,
    Database,
    Schema,
    Table,
    View,
    MaterialisedView,
    Column,
    Process,
    ColumnProcess,
    Glossary,
    GlossaryTerm,
    GlossaryCategory,

    /// Any type name the client does not model
    Other(String),
}

impl AssetKind {
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "Referenceable" => Self::Referenceable,
            "Asset" => Self::Asset,
            "Catalog" => Self::Catalog,
            "SQL" => Self::Sql,
            "Connection" => Self::Connection,
            "Database" => Self::Database,
            "Schema" => Self::Schema,
            "Table" => Self::Table,
            "View" => Self::View,
            "MaterialisedView" => Self::MaterialisedView,
            "Column" => Self::Column,
            "Process" => Self::Process,
            "ColumnProcess" => Self::ColumnProcess,
            "AtlasGlossary" => Self::Glossary,
            "AtlasGlossaryTerm" => Self::GlossaryTerm,
            "AtlasGlossaryCategory" => Self::GlossaryCategory,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Referenceable => "Referenceable",
            Self::Asset => "Asset",
            Self::Catalog => "Catalog",
            Self::Sql => "SQL",
            Self::Connection => "Connection",
            Self::Database => "Database",
            Self::Schema => "Schema",
            Self::Table => "Table",
            Self::View => "View",
            Self::MaterialisedView => "MaterialisedView",
            Self::Column => "Column",
            Self::Process => "Process",
            Self::ColumnProcess => "ColumnProcess",
            Self::Glossary => "AtlasGlossary",
            Self::GlossaryTerm => "AtlasGlossaryTerm",
            Self::GlossaryCategory => "AtlasGlossaryCategory",
            Self::Other(name) => name,
        }
    }

    /// Immediate supertype, `None` only for `Referenceable`
    pub fn supertype(&self) -> Option<AssetKind> {
        match self {
            Self::Referenceable => None,
            Self::Asset => Some(Self::Referenceable),
            Self::Catalog => Some(Self::Asset),
            Self::Sql => Some(Self::Catalog),
            Self::Database
            | Self::Schema
            | Self::Table
            | Self::View
            | Self::MaterialisedView
            | Self::Column => Some(Self::Sql),
            Self::ColumnProcess => Some(Self::Process),
            Self::Connection
            | Self::Process
            | Self::Glossary
            | Self::GlossaryTerm
            | Self::GlossaryCategory
            | Self::Other(_) => Some(Self::Asset),
        }
    }

    /// True when `self` is `other` or one of its subtypes
    pub fn is_a(&self, other: &AssetKind) -> bool {
        let mut current = Some(self.clone());
        while let Some(kind) = current {
            if &kind == other {
                return true;
            }
            current = kind.supertype();
        }
        false
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// An entity header as exchanged with the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub type_name: String,

    #[serde(default)]
    pub guid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classification_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meaning_names: Vec<String>,
}

impl Asset {
    /// A new asset with a placeholder GUID, ready to be saved
    pub fn new(kind: AssetKind, qualified_name: impl Into<String>, name: impl Into<String>) -> Self {
        let mut attributes = Map::new();
        attributes.insert("qualifiedName".to_string(), Value::String(qualified_name.into()));
        attributes.insert("name".to_string(), Value::String(name.into()));
        Self {
            type_name: kind.type_name().to_string(),
            guid: guid::placeholder_guid(),
            status: None,
            display_text: None,
            attributes,
            classification_names: Vec::new(),
            meaning_names: Vec::new(),
        }
    }

    /// A bare reference to an existing asset by GUID
    pub fn reference(kind: AssetKind, guid: impl Into<String>) -> Self {
        Self {
            type_name: kind.type_name().to_string(),
            guid: guid.into(),
            status: None,
            display_text: None,
            attributes: Map::new(),
            classification_names: Vec::new(),
            meaning_names: Vec::new(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        AssetKind::from_type_name(&self.type_name)
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.attributes.get("qualifiedName").and_then(|v| v.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(|v| v.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.status == Some(EntityStatus::Active)
    }

    /// Whether the GUID is server-issued rather than a placeholder
    pub fn has_resolved_guid(&self) -> bool {
        guid::is_resolved_guid(&self.guid)
    }
}

/// Keep only assets of the given kind (or its subtypes), preserving order
pub fn sublist<'a, I>(assets: I, kind: &AssetKind) -> Vec<&'a Asset>
where
    I: IntoIterator<Item = &'a Asset>,
{
    assets.into_iter().filter(|a| a.kind().is_a(kind)).collect()
}
