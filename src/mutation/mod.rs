//! Bulk mutation results
//!
//! Reconciling what was submitted in a bulk save or delete with what the
//! server reports it did.

pub mod deletion;
pub mod response;

pub use deletion::AssetDeletionResponse;
pub use response::{AssetMutationResponse, MutatedAssets, MutationType};
