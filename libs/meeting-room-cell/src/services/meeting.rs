// libs/meeting-room-cell/src/services/meeting.rs
use std::sync::Arc;

use tracing::{info, instrument};

use consultation_cell::models::{Consultation, ConsultationStatus};
use consultation_cell::services::ConsultationStore;
use shared_config::AppConfig;
use shared_models::auth::User;

use crate::models::{MeetingAudience, MeetingLinkResponse, MeetingRoom, MeetingRoomError};
use crate::services::cache::MeetingRoomCache;

/// Resolves "Join Meeting" links for the patient and clinic views.
///
/// Both views derive from the stored `(id, patient_email)` pair through the
/// same cache, so they always agree.
pub struct MeetingLinkService {
    store: ConsultationStore,
    rooms: Arc<MeetingRoomCache>,
}

impl MeetingLinkService {
    pub fn new(config: &AppConfig, rooms: Arc<MeetingRoomCache>) -> Self {
        Self::with_store(ConsultationStore::new(config), rooms)
    }

    pub fn with_store(store: ConsultationStore, rooms: Arc<MeetingRoomCache>) -> Self {
        Self { store, rooms }
    }

    #[instrument(skip(self, user, auth_token), fields(user_id = %user.id))]
    pub async fn patient_meeting_link(
        &self,
        consultation_id: &str,
        user: &User,
        auth_token: &str,
    ) -> Result<MeetingLinkResponse, MeetingRoomError> {
        let consultation = self.store.get_consultation(consultation_id, auth_token).await?;

        if !consultation.is_owned_by(user) {
            return Err(MeetingRoomError::Unauthorized);
        }

        self.link_for(&consultation, MeetingAudience::Patient).await
    }

    #[instrument(skip(self, user, auth_token), fields(user_id = %user.id))]
    pub async fn doctor_meeting_link(
        &self,
        consultation_id: &str,
        user: &User,
        auth_token: &str,
    ) -> Result<MeetingLinkResponse, MeetingRoomError> {
        if !user.is_clinician() {
            return Err(MeetingRoomError::Unauthorized);
        }

        let consultation = self.store.get_consultation(consultation_id, auth_token).await?;
        self.link_for(&consultation, MeetingAudience::Doctor).await
    }

    /// Derivation without a consultation lookup.
    pub async fn derive_direct(&self, consultation_id: &str, patient_email: &str) -> MeetingRoom {
        self.rooms.get_or_derive(consultation_id, patient_email).await
    }

    async fn link_for(
        &self,
        consultation: &Consultation,
        audience: MeetingAudience,
    ) -> Result<MeetingLinkResponse, MeetingRoomError> {
        if consultation.status == ConsultationStatus::Cancelled {
            return Err(MeetingRoomError::ConsultationUnavailable {
                status: consultation.status,
            });
        }

        let room = self
            .rooms
            .get_or_derive(&consultation.id, &consultation.patient_email)
            .await;

        info!(
            "Resolved meeting room {} for consultation {} ({:?} view)",
            room.room_id, consultation.id, audience
        );

        Ok(MeetingLinkResponse {
            consultation_id: consultation.id.clone(),
            room_id: room.room_id,
            url: room.url,
            audience,
            scheduled_at: consultation.scheduled_at,
        })
    }
}
