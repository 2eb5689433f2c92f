use crate::models::domain::Profile;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Response for session start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionResponse {
    #[serde(rename = "sessionToken")]
    pub session_token: String,
    pub email: String,
    #[serde(rename = "profileCount")]
    pub profile_count: usize,
}

/// Public view of a profile, without the voter list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCard {
    pub id: String,
    pub name: String,
    #[serde(rename = "batchYear")]
    pub batch_year: String,
    pub gender: String,
    pub bio: String,
    pub photo: Option<String>,
    pub votes: u64,
}

impl From<Profile> for ProfileCard {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            batch_year: profile.batch_year,
            gender: profile.gender,
            bio: profile.bio,
            photo: profile.photo,
            votes: profile.votes,
        }
    }
}

/// Response for the current-profile endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentProfileResponse {
    pub profile: Option<ProfileCard>,
    pub position: usize,
    pub total: usize,
    pub exhausted: bool,
}

/// Response for cursor movements (skip, reshuffle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorResponse {
    pub position: usize,
    pub total: usize,
    pub exhausted: bool,
}

/// Response for a vote attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    /// "recorded" or "already_voted"
    pub status: String,
    /// Current vote count, when known
    pub votes: Option<u64>,
}

/// Response for a successful nomination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominateResponse {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A single leaderboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    #[serde(rename = "batchYear")]
    pub batch_year: String,
    pub gender: String,
    pub votes: u64,
}

/// Response for the leaderboard endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}
