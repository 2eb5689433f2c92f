use crate::models::VoteOutcome;
use crate::services::{ProfileStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

/// Revision conflicts past this many re-reads give up
const MAX_TXN_ATTEMPTS: usize = 5;

/// Errors surfaced by the vote recorder
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("vote for profile {0} kept conflicting with concurrent writers")]
    TransactionContention(String),

    #[error(transparent)]
    Store(StoreError),
}

/// Records votes against profile documents.
///
/// Guarantees at most one vote per (profile, email) pair by running a
/// conditional read-modify-write: read the profile and its revision, check
/// the voter list, then write the new tally guarded by the revision. A
/// concurrent writer invalidates the revision, the guarded write fails with
/// a conflict, and the loop re-reads — at which point the email may have
/// been added by the other writer and the attempt resolves to AlreadyVoted.
#[derive(Clone)]
pub struct VoteRecorder {
    store: Arc<dyn ProfileStore>,
}

impl VoteRecorder {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Cast a vote for `profile_id` on behalf of a normalized email.
    ///
    /// The written tally is always `voted_by.len()`, so the
    /// votes == |voted_by| invariant holds after every successful write.
    pub async fn record_vote(
        &self,
        profile_id: &str,
        email: &str,
    ) -> Result<VoteOutcome, VoteError> {
        for attempt in 1..=MAX_TXN_ATTEMPTS {
            let (profile, revision) = match self.store.get_profile(profile_id).await {
                Ok(found) => found,
                Err(StoreError::NotFound(_)) => {
                    return Err(VoteError::ProfileNotFound(profile_id.to_string()))
                }
                Err(e) => return Err(VoteError::Store(e)),
            };

            if profile.has_voted(email) {
                tracing::debug!("Duplicate vote for profile {} ignored", profile_id);
                return Ok(VoteOutcome::AlreadyVoted {
                    votes: profile.votes,
                });
            }

            let mut voted_by = profile.voted_by;
            voted_by.push(email.to_string());
            let votes = voted_by.len() as u64;

            match self
                .store
                .update_votes_guarded(profile_id, &revision, votes, &voted_by)
                .await
            {
                Ok(()) => {
                    tracing::info!("Recorded vote for profile {} (now {})", profile_id, votes);
                    return Ok(VoteOutcome::Recorded { votes });
                }
                Err(StoreError::Conflict(_)) => {
                    tracing::debug!(
                        "Revision conflict on profile {} (attempt {}), re-reading",
                        profile_id,
                        attempt
                    );
                }
                Err(StoreError::NotFound(_)) => {
                    return Err(VoteError::ProfileNotFound(profile_id.to_string()))
                }
                Err(e) => return Err(VoteError::Store(e)),
            }
        }

        Err(VoteError::TransactionContention(profile_id.to_string()))
    }
}
