use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to start a voting session
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1))]
    pub email: String,
}

/// Request to cast a vote from an active session
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CastVoteRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "profile_id", rename = "profileId")]
    pub profile_id: String,
}

/// Request to nominate a new profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NominateProfileRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    #[serde(alias = "batch_year", rename = "batchYear")]
    pub batch_year: String,
    #[validate(length(min = 1))]
    pub gender: String,
    #[validate(length(max = 150))]
    #[serde(default)]
    pub bio: String,
    /// Optional base64-encoded photo
    #[serde(default)]
    pub photo: Option<String>,
}

/// Query parameters for the leaderboard endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}
