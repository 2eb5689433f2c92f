use rand::seq::SliceRandom;
use std::collections::HashSet;

/// A voting session: validated email, shuffled profile snapshot, cursor.
///
/// The voted set is a per-session cache to avoid re-running the vote
/// transaction for a profile the user already handled; the store-side
/// voter list stays authoritative.
#[derive(Debug, Clone)]
pub struct Session {
    email: String,
    profile_ids: Vec<String>,
    cursor: usize,
    voted: HashSet<String>,
}

impl Session {
    /// Create a session over a snapshot of profile ids, in random order
    pub fn new(email: String, mut profile_ids: Vec<String>) -> Self {
        profile_ids.shuffle(&mut rand::thread_rng());
        Self {
            email,
            profile_ids,
            cursor: 0,
            voted: HashSet::new(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// The profile currently under the cursor, if any remain
    pub fn current(&self) -> Option<&str> {
        self.profile_ids.get(self.cursor).map(String::as_str)
    }

    /// Advance past the current profile
    pub fn skip(&mut self) {
        if self.cursor < self.profile_ids.len() {
            self.cursor += 1;
        }
    }

    /// Start over with a new random order
    pub fn reshuffle(&mut self) {
        self.profile_ids.shuffle(&mut rand::thread_rng());
        self.cursor = 0;
    }

    pub fn exhausted(&self) -> bool {
        self.cursor >= self.profile_ids.len()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.profile_ids.len()
    }

    /// Flag a profile as handled within this session
    pub fn mark_voted(&mut self, profile_id: &str) {
        self.voted.insert(profile_id.to_string());
    }

    pub fn already_voted(&self, profile_id: &str) -> bool {
        self.voted.contains(profile_id)
    }
}
