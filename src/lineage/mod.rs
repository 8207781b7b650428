//! Lineage
//!
//! Requesting the lineage of an asset and walking the result as a graph.

pub mod graph;
pub mod relation;
pub mod request;
pub mod response;

pub use graph::{DirectedEdge, LineageGraph};
pub use relation::LineageRelation;
pub use request::{LineageDirection, LineageRequest};
pub use response::LineageResponse;
