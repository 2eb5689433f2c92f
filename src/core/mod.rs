// Core logic exports
pub mod leaderboard;
pub mod recorder;
pub mod session;
pub mod validator;

pub use leaderboard::{top_profiles, DEFAULT_LEADERBOARD_SIZE};
pub use recorder::{VoteError, VoteRecorder};
pub use session::Session;
pub use validator::{EmailValidator, NormalizedEmail, ValidationChecks, ValidationError};
