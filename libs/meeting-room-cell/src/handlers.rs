// libs/meeting-room-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use consultation_cell::models::ConsultationListQuery;
use consultation_cell::services::ConsultationStore;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{DeriveRoomRequest, MeetingAudience, RehydrateRoomRequest};
use crate::router::MeetingRoomState;
use crate::services::{MeetingLinkService, RoomConsistencyService};

fn require_clinician(user: &User) -> Result<(), AppError> {
    if user.is_clinician() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Doctor or admin access required".to_string()))
    }
}

fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".to_string()))
    }
}

// ==============================================================================
// JOIN LINK HANDLERS
// ==============================================================================

/// "Join Meeting" link on the patient's own consultation view
#[axum::debug_handler]
pub async fn get_patient_meeting_link(
    State(state): State<MeetingRoomState>,
    Path(consultation_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = MeetingLinkService::new(&state.config, state.rooms.clone());

    let link = service
        .patient_meeting_link(&consultation_id, &user, auth.token())
        .await?;

    Ok(Json(json!(link)))
}

/// "Join Meeting" action in the doctor/admin dashboard
#[axum::debug_handler]
pub async fn get_doctor_meeting_link(
    State(state): State<MeetingRoomState>,
    Path(consultation_id): Path<String>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = MeetingLinkService::new(&state.config, state.rooms.clone());

    let link = service
        .doctor_meeting_link(&consultation_id, &user, auth.token())
        .await?;

    Ok(Json(json!(link)))
}

// ==============================================================================
// ROOM HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn derive_room(
    State(state): State<MeetingRoomState>,
    Extension(user): Extension<User>,
    Json(request): Json<DeriveRoomRequest>,
) -> Result<Json<Value>, AppError> {
    require_clinician(&user)?;

    let service = MeetingLinkService::new(&state.config, state.rooms.clone());
    let room = service
        .derive_direct(&request.consultation_id, &request.patient_email)
        .await;

    Ok(Json(json!({
        "consultation_id": request.consultation_id,
        "room_id": room.room_id,
        "url": room.url,
        "audience": MeetingAudience::Direct
    })))
}

#[axum::debug_handler]
pub async fn rehydrate_room(
    State(state): State<MeetingRoomState>,
    Extension(user): Extension<User>,
    Json(request): Json<RehydrateRoomRequest>,
) -> Result<Json<Value>, AppError> {
    require_clinician(&user)?;

    let room = state
        .rooms
        .rehydrate(&request.consultation_id, &request.patient_email, &request.meeting_url)
        .await?;

    Ok(Json(json!({
        "success": true,
        "room": room
    })))
}

#[axum::debug_handler]
pub async fn get_room_cache_stats(
    State(state): State<MeetingRoomState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    Ok(Json(json!(state.rooms.stats().await)))
}

#[axum::debug_handler]
pub async fn clear_room_cache(
    State(state): State<MeetingRoomState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let removed = state.rooms.clear().await;

    Ok(Json(json!({
        "success": true,
        "removed": removed,
        "message": format!("Cleared {} cached meeting rooms", removed)
    })))
}

// ==============================================================================
// SYSTEM HANDLERS
// ==============================================================================

/// Admin: compare every stored meeting URL against its derived room.
/// `?status=` narrows the audit; paging is handled internally.
#[axum::debug_handler]
pub async fn audit_meeting_rooms(
    State(state): State<MeetingRoomState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ConsultationListQuery>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let consultations = ConsultationStore::new(&state.config)
        .list_all_pages(query.status, auth.token())
        .await?;

    let report = RoomConsistencyService::new().audit(&consultations);

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn meeting_health_check(
    State(state): State<MeetingRoomState>,
) -> Json<Value> {
    let stats = state.rooms.stats().await;

    Json(json!({
        "status": "healthy",
        "cache_enabled": stats.enabled,
        "cached_rooms": stats.entries
    }))
}
