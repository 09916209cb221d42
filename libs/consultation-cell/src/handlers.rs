// libs/consultation-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AttachPrescriptionRequest, ConsultationError, ConsultationListQuery, UpdateStatusRequest,
};
use crate::services::{ConsultationLifecycleService, ConsultationStore, PrescriptionWorkflow};

/// Patients get their own consultations; doctors and admins get the clinic list.
#[axum::debug_handler]
pub async fn list_consultations(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Query(query): Query<ConsultationListQuery>,
) -> Result<Json<Value>, AppError> {
    let store = ConsultationStore::new(&config);

    let consultations = if user.is_clinician() {
        store.list_all(&query, auth.token()).await?
    } else {
        let mut own = store.list_for_patient(&user, auth.token()).await?;
        own.retain(|c| c.is_owned_by(&user));
        own
    };

    Ok(Json(json!({
        "consultations": consultations,
        "total": consultations.len()
    })))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = ConsultationStore::new(&config);

    let consultation = store.get_consultation(&consultation_id, auth.token()).await?;
    if !consultation.is_visible_to(&user) {
        return Err(ConsultationError::Unauthorized.into());
    }

    Ok(Json(json!(consultation)))
}

#[axum::debug_handler]
pub async fn update_consultation_status(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = ConsultationLifecycleService::new(ConsultationStore::new(&config));

    let consultation = lifecycle
        .update_status(&consultation_id, request.status, &user, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "consultation": consultation
    })))
}

#[axum::debug_handler]
pub async fn attach_prescription(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(consultation_id): Path<String>,
    Json(request): Json<AttachPrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let workflow = PrescriptionWorkflow::new(ConsultationStore::new(&config));

    let consultation = workflow
        .attach_prescription(&consultation_id, request, &user, auth.token())
        .await?;

    Ok(Json(json!({
        "success": true,
        "consultation": consultation,
        "message": "Prescription issued"
    })))
}
