// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ErrorRecord, Profile, Revision, VoteOutcome};
pub use requests::{CastVoteRequest, LeaderboardQuery, NominateProfileRequest, StartSessionRequest};
pub use responses::{
    CurrentProfileResponse, CursorResponse, ErrorResponse, HealthResponse, LeaderboardEntry,
    LeaderboardResponse, NominateResponse, ProfileCard, StartSessionResponse, VoteResponse,
};
