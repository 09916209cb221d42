// libs/meeting-room-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consultation_cell::models::{ConsultationError, ConsultationStatus};
use shared_models::error::AppError;

// ==============================================================================
// MEETING ROOM MODELS
// ==============================================================================

/// A derived meeting room. Never stored authoritatively; recomputed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRoom {
    pub room_id: String,
    pub url: String,
}

/// Which consumer asked for the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingAudience {
    Patient,
    Doctor,
    Direct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingLinkResponse {
    pub consultation_id: String,
    pub room_id: String,
    pub url: String,
    pub audience: MeetingAudience,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeriveRoomRequest {
    pub consultation_id: String,
    pub patient_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RehydrateRoomRequest {
    pub consultation_id: String,
    pub patient_email: String,
    pub meeting_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCacheStats {
    pub enabled: bool,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub rehydrated: u64,
}

// ==============================================================================
// ROOM AUDIT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomAuditStatus {
    Consistent,
    Mismatched,      // Stored URL carries a code from another slicing scheme
    MissingUrl,
    Unparseable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAuditEntry {
    pub consultation_id: String,
    pub status: RoomAuditStatus,
    pub expected_room_id: String,
    pub found_room_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomAuditReport {
    pub total: usize,
    pub consistent: usize,
    pub mismatched: usize,
    pub missing_url: usize,
    pub unparseable: usize,
    /// Only the entries that are not consistent.
    pub findings: Vec<RoomAuditEntry>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MeetingRoomError {
    #[error("Consultation not found")]
    ConsultationNotFound,

    #[error("Not authorized for this consultation's meeting")]
    Unauthorized,

    #[error("Meeting link not available for a {status} consultation")]
    ConsultationUnavailable { status: ConsultationStatus },

    #[error("Not a meeting URL: {url}")]
    InvalidMeetingUrl { url: String },

    #[error("Stored room code {found} does not match derived code {expected}")]
    RoomCodeMismatch { expected: String, found: String },

    #[error("Consultation store error: {message}")]
    Store { message: String },
}

impl From<ConsultationError> for MeetingRoomError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::NotFound => MeetingRoomError::ConsultationNotFound,
            ConsultationError::Unauthorized => MeetingRoomError::Unauthorized,
            other => MeetingRoomError::Store {
                message: other.to_string(),
            },
        }
    }
}

impl From<MeetingRoomError> for AppError {
    fn from(err: MeetingRoomError) -> Self {
        match err {
            MeetingRoomError::ConsultationNotFound => AppError::NotFound(err.to_string()),
            MeetingRoomError::Unauthorized => AppError::Forbidden(err.to_string()),
            MeetingRoomError::ConsultationUnavailable { .. }
            | MeetingRoomError::RoomCodeMismatch { .. } => AppError::Conflict(err.to_string()),
            MeetingRoomError::InvalidMeetingUrl { .. } => AppError::BadRequest(err.to_string()),
            MeetingRoomError::Store { message } => AppError::Database(message),
        }
    }
}
