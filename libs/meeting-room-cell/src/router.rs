// libs/meeting-room-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;
use crate::services::MeetingRoomCache;

/// Router state: configuration plus the process-wide room cache.
#[derive(Clone)]
pub struct MeetingRoomState {
    pub config: Arc<AppConfig>,
    pub rooms: Arc<MeetingRoomCache>,
}

pub fn meeting_room_routes(config: Arc<AppConfig>, rooms: Arc<MeetingRoomCache>) -> Router {
    let state = MeetingRoomState {
        config: config.clone(),
        rooms,
    };

    let public_routes = Router::new()
        .route("/health", get(meeting_health_check));

    let protected_routes = Router::new()
        // Join links, one per consumer
        .route("/patient/consultations/{consultation_id}", get(get_patient_meeting_link))
        .route("/admin/consultations/{consultation_id}", get(get_doctor_meeting_link))

        // Direct derivation and cache maintenance
        .route("/rooms/derive", post(derive_room))
        .route("/rooms/rehydrate", post(rehydrate_room))
        .route("/rooms/cache", get(get_room_cache_stats).delete(clear_room_cache))

        .route("/admin/audit", get(audit_meeting_rooms))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
