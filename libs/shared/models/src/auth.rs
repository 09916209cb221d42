use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Role carried in the `role` claim of a Supabase access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Patient,
    Doctor,
    Admin,
}

impl UserRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "patient" => Some(Self::Patient),
            "doctor" => Some(Self::Doctor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Unknown or missing roles are treated as patients.
    pub fn role(&self) -> UserRole {
        self.role
            .as_deref()
            .and_then(UserRole::parse)
            .unwrap_or(UserRole::Patient)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }

    /// Doctors and admins manage consultations on the clinic side.
    pub fn is_clinician(&self) -> bool {
        matches!(self.role(), UserRole::Doctor | UserRole::Admin)
    }
}
