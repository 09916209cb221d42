// libs/consultation-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use shared_models::auth::User;

use crate::models::{Consultation, ConsultationError, ConsultationStatus};
use crate::services::store::ConsultationStore;

pub struct ConsultationLifecycleService {
    store: ConsultationStore,
}

impl ConsultationLifecycleService {
    pub fn new(store: ConsultationStore) -> Self {
        Self { store }
    }

    pub fn valid_transitions(current: ConsultationStatus) -> &'static [ConsultationStatus] {
        match current {
            ConsultationStatus::Pending => &[
                ConsultationStatus::Confirmed,
                ConsultationStatus::Cancelled,
            ],
            ConsultationStatus::Confirmed => &[
                ConsultationStatus::Completed,
                ConsultationStatus::Cancelled,
            ],
            ConsultationStatus::Completed | ConsultationStatus::Cancelled => &[],
        }
    }

    pub fn validate_transition(
        current: ConsultationStatus,
        next: ConsultationStatus,
    ) -> Result<(), ConsultationError> {
        debug!("Validating status transition from {} to {}", current, next);

        if current.is_terminal() || !Self::valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(ConsultationError::InvalidStatusTransition {
                from: current,
                to: next,
            });
        }

        Ok(())
    }

    /// Moves a consultation to `next`; only doctors and admins may do this.
    pub async fn update_status(
        &self,
        consultation_id: &str,
        next: ConsultationStatus,
        user: &User,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        if !user.is_clinician() {
            return Err(ConsultationError::Unauthorized);
        }

        let consultation = self.store.get_consultation(consultation_id, auth_token).await?;
        Self::validate_transition(consultation.status, next)?;

        let updated = self
            .store
            .update_status(consultation_id, consultation.status, next, auth_token)
            .await?;
        info!(
            "Consultation {} moved {} -> {} by {}",
            consultation_id, consultation.status, next, user.id
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_forward_transitions_are_allowed() {
        use ConsultationStatus::*;
        assert!(ConsultationLifecycleService::validate_transition(Pending, Confirmed).is_ok());
        assert!(ConsultationLifecycleService::validate_transition(Pending, Cancelled).is_ok());
        assert!(ConsultationLifecycleService::validate_transition(Confirmed, Completed).is_ok());
        assert!(ConsultationLifecycleService::validate_transition(Confirmed, Cancelled).is_ok());
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        use ConsultationStatus::*;
        for next in [Pending, Confirmed, Completed, Cancelled] {
            assert_matches!(
                ConsultationLifecycleService::validate_transition(Completed, next),
                Err(ConsultationError::InvalidStatusTransition { from: Completed, .. })
            );
            assert!(ConsultationLifecycleService::validate_transition(Cancelled, next).is_err());
        }
    }

    #[test]
    fn test_pending_cannot_skip_to_completed() {
        assert_matches!(
            ConsultationLifecycleService::validate_transition(
                ConsultationStatus::Pending,
                ConsultationStatus::Completed
            ),
            Err(ConsultationError::InvalidStatusTransition { .. })
        );
    }
}
