use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use consultation_cell::router::consultation_routes;
use meeting_room_cell::{meeting_room_routes, MeetingRoomCache};
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>, rooms: Arc<MeetingRoomCache>) -> Router {
    Router::new()
        .route("/", get(|| async { "Telehealth API is running!" }))
        .nest("/consultations", consultation_routes(state.clone()))
        .nest("/meetings", meeting_room_routes(state, rooms))
}
