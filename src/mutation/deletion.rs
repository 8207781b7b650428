//! Deletion responses and waiting for deletions to settle
//!
//! The platform acknowledges a delete before it is visible everywhere: the
//! asset may still be served as ACTIVE for a while, and background tasks that
//! reference it (classification propagation and the like) keep running.
//! [`AssetDeletionResponse::block`] waits for both to settle.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use super::AssetMutationResponse;
use crate::client::{AssetFetcher, TaskIndex, TaskStatus};
use crate::error::{AtlanError, Result};
use crate::retry::Poller;

const ACTIVE_TASK_STATUSES: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::InProgress];

/// Response to a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetDeletionResponse(AssetMutationResponse);

impl AssetDeletionResponse {
    pub fn new(inner: AssetMutationResponse) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> AssetMutationResponse {
        self.0
    }

    /// Block until every deleted asset is confirmed gone and no background
    /// task still references any of them
    ///
    /// Returns immediately, without any request, when nothing was deleted.
    pub fn block<C>(&self, client: &C, poller: &Poller) -> Result<()>
    where
        C: AssetFetcher + TaskIndex + ?Sized,
    {
        let guids: Vec<String> = self.deleted_assets().iter().map(|a| a.guid.clone()).collect();
        if guids.is_empty() {
            return Ok(());
        }

        tracing::info!(count = guids.len(), "waiting for deletion to complete");
        confirm_removed(client, guids.clone(), poller)?;
        Self::block_for_background_tasks(client, &guids, poller)
    }

    /// Block until no pending or in-progress task references any of `guids`
    ///
    /// `pending` in an overrun counts the assets waited on, not their tasks.
    /// Any error while polling ends the wait with [`AtlanError::RetryOverrun`]
    /// carrying that error, except an interruption, which is returned as is.
    pub fn block_for_background_tasks<T>(tasks: &T, guids: &[String], poller: &Poller) -> Result<()>
    where
        T: TaskIndex + ?Sized,
    {
        let max = poller.max_retries();

        for attempt in 0..=max {
            match tasks.count_tasks(guids, &ACTIVE_TASK_STATUSES) {
                Ok(0) => {
                    tracing::debug!(attempt, "background tasks drained");
                    return Ok(());
                }
                Ok(count) => {
                    tracing::debug!(attempt, count, "background tasks still running");
                }
                Err(AtlanError::Interrupted) => return Err(AtlanError::Interrupted),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "background task query failed");
                    return Err(AtlanError::RetryOverrun {
                        retries: attempt,
                        pending: guids.len(),
                        source: Some(Box::new(e)),
                    });
                }
            }
            if attempt < max {
                poller.pause(attempt)?;
            }
        }

        tracing::warn!(pending = guids.len(), retries = max, "background tasks did not drain");
        Err(AtlanError::RetryOverrun {
            retries: max,
            pending: guids.len(),
            source: None,
        })
    }
}

impl Deref for AssetDeletionResponse {
    type Target = AssetMutationResponse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AssetMutationResponse> for AssetDeletionResponse {
    fn from(inner: AssetMutationResponse) -> Self {
        Self(inner)
    }
}

/// Re-fetch each pending asset until all are gone or no longer active.
/// A round completes, and its backoff elapses, before the next starts.
fn confirm_removed<C>(client: &C, mut pending: Vec<String>, poller: &Poller) -> Result<()>
where
    C: AssetFetcher + ?Sized,
{
    let max = poller.max_retries();
    let mut retry = 0;

    loop {
        let mut leftovers = Vec::new();
        for guid in pending {
            match client.get_asset_by_guid(&guid, true) {
                Ok(asset) if asset.is_active() => leftovers.push(guid),
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::debug!(guid = %guid, error = %e, "deletion check failed, will retry");
                    leftovers.push(guid);
                }
            }
        }

        if leftovers.is_empty() {
            tracing::debug!(rounds = retry + 1, "deletion confirmed");
            return Ok(());
        }
        if retry >= max {
            tracing::warn!(pending = leftovers.len(), retries = retry, "deletion not confirmed");
            return Err(AtlanError::RetryOverrun {
                retries: retry,
                pending: leftovers.len(),
                source: None,
            });
        }

        poller.pause(retry)?;
        retry += 1;
        pending = leftovers;
    }
}
