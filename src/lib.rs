//! Campus Vote - profile voting backend for the campus crush voting app
//!
//! This library provides the two pieces of logic the app actually depends
//! on: institutional email validation and atomic vote recording against a
//! hosted document database, plus the session, nomination, and leaderboard
//! plumbing around them.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    top_profiles, EmailValidator, NormalizedEmail, Session, ValidationChecks, ValidationError,
    VoteError, VoteRecorder,
};
pub use models::{ErrorRecord, Profile, Revision, VoteOutcome};
pub use services::{DisposableDomains, MxResolver, ProfileStore, StoreError};
