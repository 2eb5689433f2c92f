use serde::{Deserialize, Serialize};

/// Candidate profile document, as stored in the "profiles" collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "batchYear")]
    pub batch_year: String,
    pub gender: String,
    pub bio: String,
    /// Base64-encoded image blob, decoded size capped at 1 MiB
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub votes: u64,
    #[serde(rename = "votedBy", default)]
    pub voted_by: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Profile {
    /// Whether the given normalized email has already voted for this profile
    pub fn has_voted(&self, email: &str) -> bool {
        self.voted_by.iter().any(|e| e == email)
    }

    /// The vote counter must always equal the number of distinct voters
    pub fn tally_consistent(&self) -> bool {
        self.votes as usize == self.voted_by.len()
    }
}

/// Opaque revision token returned by the document store.
///
/// A guarded update only succeeds if the document has not been written
/// since this revision was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(pub String);

impl Revision {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of a vote transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was recorded; `votes` is the new counter value
    Recorded { votes: u64 },
    /// This email had already voted for the profile; nothing was written
    AlreadyVoted { votes: u64 },
}

impl VoteOutcome {
    pub fn votes(&self) -> u64 {
        match self {
            VoteOutcome::Recorded { votes } => *votes,
            VoteOutcome::AlreadyVoted { votes } => *votes,
        }
    }
}

/// Audit record appended to the "errors" collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub error_type: String,
    pub message: String,
    pub user_email: String,
    pub page: String,
}

impl ErrorRecord {
    pub fn new(error_type: &str, message: String, user_email: &str) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            error_type: error_type.to_string(),
            message,
            user_email: user_email.to_string(),
            page: "voting_interface".to_string(),
        }
    }
}
