use crate::core::{top_profiles, EmailValidator, Session, VoteError, VoteRecorder};
use crate::models::{
    CastVoteRequest, CurrentProfileResponse, CursorResponse, ErrorRecord, ErrorResponse,
    HealthResponse, LeaderboardEntry, LeaderboardQuery, LeaderboardResponse,
    NominateProfileRequest, NominateResponse, Profile, ProfileCard, StartSessionRequest,
    StartSessionResponse, VoteOutcome, VoteResponse,
};
use crate::services::{ProfileStore, SessionManager, StoreError};
use actix_web::{web, HttpResponse, Responder};
use base64::Engine;
use std::sync::Arc;
use validator::Validate;

/// Decoded photo blobs above this size are rejected
const MAX_PHOTO_BYTES: usize = 1_048_576;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub validator: Arc<EmailValidator>,
    pub recorder: VoteRecorder,
    pub sessions: Arc<SessionManager>,
    pub leaderboard_size: usize,
}

/// Configure all voting routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/sessions", web::post().to(start_session))
        .route("/sessions/{token}/current", web::get().to(current_profile))
        .route("/sessions/{token}/skip", web::post().to(skip_profile))
        .route("/sessions/{token}/reshuffle", web::post().to(reshuffle))
        .route("/sessions/{token}/vote", web::post().to(cast_vote))
        .route("/profiles", web::post().to(nominate_profile))
        .route("/leaderboard", web::get().to(leaderboard));
}

/// Write an audit record to the errors collection, best-effort
async fn audit(store: &Arc<dyn ProfileStore>, error_type: &str, message: String, email: &str) {
    let record = ErrorRecord::new(error_type, message, email);
    if let Err(e) = store.record_error(&record).await {
        tracing::warn!("Failed to write audit record: {}", e);
    }
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "internal_error".to_string(),
        message: message.to_string(),
        status_code: 500,
    })
}

fn unknown_session() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse {
        error: "unknown_session".to_string(),
        message: "Session not found or expired, start a new one".to_string(),
        status_code: 404,
    })
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Start a voting session
///
/// POST /api/v1/sessions
///
/// Request body:
/// ```json
/// { "email": "b22275@students.iitmandi.ac.in" }
/// ```
///
/// Validates the email, snapshots the profile list in random order, and
/// returns an opaque session token.
async fn start_session(
    state: web::Data<AppState>,
    req: web::Json<StartSessionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let email = match state.validator.validate(&req.email).await {
        Ok(email) => email,
        Err(e) => {
            tracing::info!("Rejected email at session start: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_email".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    let profiles = match state.store.list_profiles().await {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::error!("Failed to load profiles: {}", e);
            audit(&state.store, "PROFILE_LOAD_ERROR", e.to_string(), email.as_str()).await;
            return internal_error("Failed to load profiles. Please try again later.");
        }
    };

    let profile_ids: Vec<String> = profiles.into_iter().map(|p| p.id).collect();
    let profile_count = profile_ids.len();

    let session = Session::new(email.as_str().to_string(), profile_ids);
    let token = state.sessions.create(session).await;

    tracing::info!("Started session with {} profiles", profile_count);

    HttpResponse::Ok().json(StartSessionResponse {
        session_token: token,
        email: email.into_inner(),
        profile_count,
    })
}

/// Get the profile currently under the session cursor
///
/// GET /api/v1/sessions/{token}/current
async fn current_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let token = path.into_inner();
    let session = match state.sessions.get(&token).await {
        Some(session) => session,
        None => return unknown_session(),
    };

    let profile_id = match session.current() {
        Some(id) => id.to_string(),
        None => {
            return HttpResponse::Ok().json(CurrentProfileResponse {
                profile: None,
                position: session.position(),
                total: session.total(),
                exhausted: true,
            });
        }
    };

    match state.store.get_profile(&profile_id).await {
        Ok((profile, _revision)) => HttpResponse::Ok().json(CurrentProfileResponse {
            profile: Some(ProfileCard::from(profile)),
            position: session.position(),
            total: session.total(),
            exhausted: false,
        }),
        Err(StoreError::NotFound(_)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "profile_not_found".to_string(),
            message: format!("Profile {} no longer exists", profile_id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch profile {}: {}", profile_id, e);
            audit(&state.store, "PROFILE_LOAD_ERROR", e.to_string(), session.email()).await;
            internal_error("Failed to load profile. Please try again later.")
        }
    }
}

/// Advance the session cursor past the current profile
///
/// POST /api/v1/sessions/{token}/skip
async fn skip_profile(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let token = path.into_inner();
    let mut session = match state.sessions.get(&token).await {
        Some(session) => session,
        None => return unknown_session(),
    };

    session.skip();
    let response = CursorResponse {
        position: session.position(),
        total: session.total(),
        exhausted: session.exhausted(),
    };
    state.sessions.update(&token, session).await;

    HttpResponse::Ok().json(response)
}

/// Start over with a new random order
///
/// POST /api/v1/sessions/{token}/reshuffle
async fn reshuffle(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let token = path.into_inner();
    let mut session = match state.sessions.get(&token).await {
        Some(session) => session,
        None => return unknown_session(),
    };

    session.reshuffle();
    let response = CursorResponse {
        position: session.position(),
        total: session.total(),
        exhausted: session.exhausted(),
    };
    state.sessions.update(&token, session).await;

    HttpResponse::Ok().json(response)
}

/// Cast a vote for a profile
///
/// POST /api/v1/sessions/{token}/vote
///
/// Request body:
/// ```json
/// { "profileId": "string" }
/// ```
///
/// At most one vote is recorded per (profile, email) pair; a repeat
/// attempt reports "already_voted" without changing the tally.
async fn cast_vote(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<CastVoteRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let token = path.into_inner();
    let mut session = match state.sessions.get(&token).await {
        Some(session) => session,
        None => return unknown_session(),
    };

    // Session-local flag short-circuits repeat attempts; the store-side
    // voter list stays authoritative for anything it has not seen.
    if session.already_voted(&req.profile_id) {
        return HttpResponse::Ok().json(VoteResponse {
            status: "already_voted".to_string(),
            votes: None,
        });
    }

    match state
        .recorder
        .record_vote(&req.profile_id, session.email())
        .await
    {
        Ok(VoteOutcome::Recorded { votes }) => {
            session.mark_voted(&req.profile_id);
            // Voting moves on to the next profile, matching the skip flow
            if session.current() == Some(req.profile_id.as_str()) {
                session.skip();
            }
            state.sessions.update(&token, session).await;

            HttpResponse::Ok().json(VoteResponse {
                status: "recorded".to_string(),
                votes: Some(votes),
            })
        }
        Ok(VoteOutcome::AlreadyVoted { votes }) => {
            session.mark_voted(&req.profile_id);
            state.sessions.update(&token, session).await;

            HttpResponse::Ok().json(VoteResponse {
                status: "already_voted".to_string(),
                votes: Some(votes),
            })
        }
        Err(VoteError::ProfileNotFound(id)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "profile_not_found".to_string(),
            message: format!("Profile {} does not exist", id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to record vote for {}: {}", req.profile_id, e);
            audit(
                &state.store,
                "VOTING_ERROR",
                format!("{} - Profile: {}", e, req.profile_id),
                session.email(),
            )
            .await;
            internal_error("Failed to record vote. Please try again.")
        }
    }
}

/// Nomination rules the derive attributes cannot express: the name must
/// survive trimming, and photos must be valid base64 within the size cap
fn check_nomination(req: &NominateProfileRequest) -> Result<(), ErrorResponse> {
    if req.name.trim().is_empty() {
        return Err(ErrorResponse {
            error: "validation_failed".to_string(),
            message: "Name must not be blank".to_string(),
            status_code: 400,
        });
    }

    if let Some(photo) = &req.photo {
        match base64::engine::general_purpose::STANDARD.decode(photo) {
            Ok(bytes) if bytes.len() > MAX_PHOTO_BYTES => {
                return Err(ErrorResponse {
                    error: "photo_too_large".to_string(),
                    message: "Image exceeds the 1 MiB size limit".to_string(),
                    status_code: 400,
                });
            }
            Ok(_) => {}
            Err(e) => {
                return Err(ErrorResponse {
                    error: "invalid_photo".to_string(),
                    message: format!("Photo is not valid base64: {}", e),
                    status_code: 400,
                });
            }
        }
    }

    Ok(())
}

/// Nominate a new profile
///
/// POST /api/v1/profiles
async fn nominate_profile(
    state: web::Data<AppState>,
    req: web::Json<NominateProfileRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if let Err(err) = check_nomination(&req) {
        return HttpResponse::BadRequest().json(err);
    }

    let profile = Profile {
        id: String::new(),
        name: req.name.trim().to_string(),
        batch_year: req.batch_year.clone(),
        gender: req.gender.clone(),
        bio: req.bio.trim().to_string(),
        photo: req.photo.clone(),
        votes: 0,
        voted_by: vec![],
        created_at: chrono::Utc::now(),
    };

    match state.store.create_profile(&profile).await {
        Ok(created) => {
            tracing::info!("Nominated profile {} ({})", created.id, created.name);
            HttpResponse::Created().json(NominateResponse {
                id: created.id,
                created_at: created.created_at,
            })
        }
        Err(e) => {
            tracing::error!("Failed to create profile: {}", e);
            audit(&state.store, "PROFILE_SUBMIT_ERROR", e.to_string(), "unknown").await;
            internal_error("Failed to submit profile. Please try again.")
        }
    }
}

/// Current leaderboard, top profiles by vote count
///
/// GET /api/v1/leaderboard?limit=10
async fn leaderboard(
    state: web::Data<AppState>,
    query: web::Query<LeaderboardQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(state.leaderboard_size).min(50);

    let profiles = match state.store.list_profiles().await {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::error!("Failed to load leaderboard: {}", e);
            audit(&state.store, "LEADERBOARD_ERROR", e.to_string(), "unknown").await;
            return internal_error("Failed to load leaderboard");
        }
    };

    let entries: Vec<LeaderboardEntry> = top_profiles(profiles, limit)
        .into_iter()
        .enumerate()
        .map(|(idx, p)| LeaderboardEntry {
            rank: idx + 1,
            name: p.name,
            batch_year: p.batch_year,
            gender: p.gender,
            votes: p.votes,
        })
        .collect();

    HttpResponse::Ok().json(LeaderboardResponse { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nomination(name: &str, photo: Option<String>) -> NominateProfileRequest {
        NominateProfileRequest {
            name: name.to_string(),
            batch_year: "2024".to_string(),
            gender: "Female".to_string(),
            bio: "short bio".to_string(),
            photo,
        }
    }

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_photo_limit_is_one_mib() {
        assert_eq!(MAX_PHOTO_BYTES, 1024 * 1024);
    }

    #[test]
    fn test_blank_name_rejected_after_trim() {
        // Whitespace-only names clear the derive length check but must
        // not produce a profile with an empty name
        let req = nomination("   ", None);
        assert!(req.validate().is_ok());

        let err = check_nomination(&req).unwrap_err();
        assert_eq!(err.error, "validation_failed");
    }

    #[test]
    fn test_valid_nomination_passes() {
        let photo = base64::engine::general_purpose::STANDARD.encode([0u8; 64]);
        let req = nomination("Asha", Some(photo));

        assert!(check_nomination(&req).is_ok());
    }

    #[test]
    fn test_oversized_photo_rejected() {
        let blob = vec![0u8; MAX_PHOTO_BYTES + 1];
        let photo = base64::engine::general_purpose::STANDARD.encode(blob);
        let req = nomination("Asha", Some(photo));

        let err = check_nomination(&req).unwrap_err();
        assert_eq!(err.error, "photo_too_large");
    }

    #[test]
    fn test_photo_at_limit_accepted() {
        let blob = vec![0u8; MAX_PHOTO_BYTES];
        let photo = base64::engine::general_purpose::STANDARD.encode(blob);
        let req = nomination("Asha", Some(photo));

        assert!(check_nomination(&req).is_ok());
    }

    #[test]
    fn test_non_base64_photo_rejected() {
        let req = nomination("Asha", Some("not base64 !!!".to_string()));

        let err = check_nomination(&req).unwrap_err();
        assert_eq!(err.error, "invalid_photo");
    }
}
