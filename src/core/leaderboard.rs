use crate::models::Profile;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Rank profiles by vote count, descending, and keep the top `limit`.
///
/// The sort is stable so equal vote counts keep their snapshot order.
pub fn top_profiles(mut profiles: Vec<Profile>, limit: usize) -> Vec<Profile> {
    profiles.sort_by(|a, b| b.votes.cmp(&a.votes));
    profiles.truncate(limit);
    profiles
}
