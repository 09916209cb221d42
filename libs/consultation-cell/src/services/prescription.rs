// libs/consultation-cell/src/services/prescription.rs
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use shared_models::auth::User;

use crate::models::{
    AttachPrescriptionRequest, Consultation, ConsultationError, ConsultationStatus, Prescription,
};
use crate::services::store::ConsultationStore;

/// Issues a prescription against a consultation and closes it.
pub struct PrescriptionWorkflow {
    store: ConsultationStore,
}

impl PrescriptionWorkflow {
    pub fn new(store: ConsultationStore) -> Self {
        Self { store }
    }

    pub fn validate_request(request: &AttachPrescriptionRequest) -> Result<(), ConsultationError> {
        if request.medications.is_empty() {
            return Err(ConsultationError::ValidationError {
                message: "At least one medication is required".to_string(),
            });
        }

        for (index, medication) in request.medications.iter().enumerate() {
            if medication.name.trim().is_empty() {
                return Err(ConsultationError::ValidationError {
                    message: format!("Medication {} is missing a name", index + 1),
                });
            }
            if medication.dosage.trim().is_empty() {
                return Err(ConsultationError::ValidationError {
                    message: format!("Medication '{}' is missing a dosage", medication.name),
                });
            }
        }

        Ok(())
    }

    #[instrument(skip(self, request, user, auth_token), fields(user_id = %user.id))]
    pub async fn attach_prescription(
        &self,
        consultation_id: &str,
        request: AttachPrescriptionRequest,
        user: &User,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        if !user.is_clinician() {
            return Err(ConsultationError::Unauthorized);
        }
        Self::validate_request(&request)?;

        let consultation = self.store.get_consultation(consultation_id, auth_token).await?;
        if consultation.status == ConsultationStatus::Cancelled {
            return Err(ConsultationError::Cancelled);
        }
        if consultation.prescription.is_some() {
            return Err(ConsultationError::PrescriptionAlreadyIssued);
        }

        let prescription = Prescription {
            id: Uuid::new_v4(),
            medications: request.medications,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            issued_by: user.id.clone(),
            issued_at: Utc::now(),
        };

        let updated = self
            .store
            .save_prescription(
                consultation_id,
                &prescription,
                ConsultationStatus::Completed,
                auth_token,
            )
            .await?;

        info!(
            "Prescription {} issued for consultation {}",
            prescription.id, consultation_id
        );

        Ok(updated)
    }
}
