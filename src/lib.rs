//! Atlan client
//!
//! Typed access to lineage and bulk mutation on an Atlan tenant.
//!
//! ## Features
//!
//! - **Lineage Graphs**: Walk the lineage of an asset upstream or downstream,
//!   one hop at a time or exhaustively, safely across cycles
//! - **Mutation Reconciliation**: Match submitted assets (by placeholder or real
//!   GUID) to what a bulk save actually did to them
//! - **Deletion Confirmation**: Block until deleted assets are gone and their
//!   background tasks have drained, with bounded, interruptible backoff
//!
//! ## Architecture
//!
//! ```text
//! LineageRequest ──fetch──▶ LineageResponse ──lazy──▶ LineageGraph
//!                              │                       (DFS, neighbours)
//!                              └─ guidEntityMap ─▶ hydrated Assets
//!
//! save/delete ──▶ AssetMutationResponse ──▶ mutation_type / result_for
//!                   └─ AssetDeletionResponse::block
//!                        ├─ confirm removed (re-fetch until gone)
//!                        └─ drain background tasks
//! ```

pub mod asset;
pub mod client;
pub mod config;
pub mod error;
pub mod guid;
pub mod lineage;
pub mod mutation;
pub mod retry;

pub use asset::{Asset, AssetKind, EntityStatus};
pub use client::{AssetFetcher, AssetMutator, AtlanClient, DeleteType, LineageTransport, TaskIndex, TaskStatus};
pub use config::AtlanConfig;
pub use error::{AtlanError, Result};
pub use lineage::{DirectedEdge, LineageDirection, LineageGraph, LineageRelation, LineageRequest, LineageResponse};
pub use mutation::{AssetDeletionResponse, AssetMutationResponse, MutatedAssets, MutationType};
pub use retry::{Backoff, CancelHandle, InterruptibleSleeper, Poller, Sleeper};
