// libs/consultation-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

// ==============================================================================
// CONSULTATION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    /// Kept exactly as booked; meeting rooms are derived from it verbatim.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub patient_email: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: ConsultationStatus,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub prescription: Option<Prescription>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Consultation {
    /// A patient owns a consultation booked under their user id or their email.
    pub fn is_owned_by(&self, user: &User) -> bool {
        if self.patient_id.as_deref() == Some(user.id.as_str()) {
            return true;
        }
        match user.email.as_deref() {
            Some(email) if !self.patient_email.is_empty() => {
                self.patient_email.eq_ignore_ascii_case(email)
            }
            _ => false,
        }
    }

    pub fn is_visible_to(&self, user: &User) -> bool {
        user.is_clinician() || self.is_owned_by(user)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ConsultationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationStatus::Pending => "pending",
            ConsultationStatus::Confirmed => "confirmed",
            ConsultationStatus::Completed => "completed",
            ConsultationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConsultationStatus::Completed | ConsultationStatus::Cancelled)
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub duration_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub notes: Option<String>,
    pub issued_by: String,
    pub issued_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST DTOs
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AttachPrescriptionRequest {
    pub medications: Vec<Medication>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ConsultationStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsultationListQuery {
    pub status: Option<ConsultationStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConsultationError {
    #[error("Consultation not found")]
    NotFound,

    #[error("Not authorized for this consultation")]
    Unauthorized,

    #[error("Cannot move consultation from {from} to {to}")]
    InvalidStatusTransition {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },

    #[error("Consultation has been cancelled")]
    Cancelled,

    #[error("A prescription has already been issued for this consultation")]
    PrescriptionAlreadyIssued,

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },
}

impl From<anyhow::Error> for ConsultationError {
    fn from(err: anyhow::Error) -> Self {
        ConsultationError::DatabaseError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConsultationError {
    fn from(err: serde_json::Error) -> Self {
        ConsultationError::DatabaseError {
            message: format!("Malformed consultation record: {}", err),
        }
    }
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::NotFound => AppError::NotFound(err.to_string()),
            ConsultationError::Unauthorized => AppError::Forbidden(err.to_string()),
            ConsultationError::InvalidStatusTransition { .. }
            | ConsultationError::Cancelled
            | ConsultationError::PrescriptionAlreadyIssued => AppError::Conflict(err.to_string()),
            ConsultationError::ValidationError { message } => AppError::ValidationError(message),
            ConsultationError::DatabaseError { message } => AppError::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(id: &str, email: Option<&str>, role: &str) -> User {
        User {
            id: id.to_string(),
            email: email.map(str::to_string),
            role: Some(role.to_string()),
            metadata: None,
            created_at: None,
        }
    }

    fn consultation(patient_id: Option<&str>, email: &str) -> Consultation {
        serde_json::from_value(json!({
            "id": "cons_1",
            "patient_id": patient_id,
            "patient_email": email,
            "status": "pending"
        }))
        .unwrap()
    }

    #[test]
    fn test_null_patient_email_deserializes_as_empty() {
        let c: Consultation = serde_json::from_value(json!({
            "id": "cons_9",
            "patient_email": null,
            "status": "confirmed"
        }))
        .unwrap();
        assert_eq!(c.patient_email, "");
        assert_eq!(c.status, ConsultationStatus::Confirmed);
        assert!(c.prescription.is_none());
    }

    #[test]
    fn test_ownership_by_id_or_email() {
        let c = consultation(Some("patient-1"), "Sarah@Example.com");

        assert!(c.is_owned_by(&user("patient-1", None, "patient")));
        assert!(c.is_owned_by(&user("other", Some("sarah@example.com"), "patient")));
        assert!(!c.is_owned_by(&user("other", Some("mallory@example.com"), "patient")));
        assert!(c.is_visible_to(&user("doc", None, "doctor")));
    }

    #[test]
    fn test_empty_email_never_matches() {
        let c = consultation(None, "");
        assert!(!c.is_owned_by(&user("someone", Some(""), "patient")));
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&ConsultationStatus::Cancelled).unwrap(), "\"cancelled\"");
        assert_eq!(ConsultationStatus::Completed.to_string(), "completed");
        assert!(ConsultationStatus::Cancelled.is_terminal());
        assert!(!ConsultationStatus::Confirmed.is_terminal());
    }
}
