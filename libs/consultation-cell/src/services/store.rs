// libs/consultation-cell/src/services/store.rs
use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;

use crate::models::{
    Consultation, ConsultationError, ConsultationListQuery, ConsultationStatus, Prescription,
};

const CONSULTATIONS_PATH: &str = "/rest/v1/consultations";
const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Supabase-backed access to consultation rows.
#[derive(Clone)]
pub struct ConsultationStore {
    supabase: Arc<SupabaseClient>,
}

impl ConsultationStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub fn with_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    #[instrument(skip(self, auth_token))]
    pub async fn get_consultation(
        &self,
        consultation_id: &str,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        let path = format!(
            "{}?id=eq.{}",
            CONSULTATIONS_PATH,
            urlencoding::encode(consultation_id)
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        first_row(rows)
    }

    pub async fn list_for_patient(
        &self,
        patient: &User,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, ConsultationError> {
        debug!("Listing consultations for patient {}", patient.id);

        let owner_filter = match patient.email.as_deref() {
            Some(email) if !email.is_empty() => format!(
                "or=(patient_id.eq.{},patient_email.ilike.{})",
                urlencoding::encode(&patient.id),
                urlencoding::encode(&escape_like(email))
            ),
            _ => format!("patient_id=eq.{}", urlencoding::encode(&patient.id)),
        };
        let path = format!(
            "{}?{}&order=scheduled_at.desc",
            CONSULTATIONS_PATH, owner_filter
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        parse_rows(rows)
    }

    pub async fn list_all(
        &self,
        query: &ConsultationListQuery,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, ConsultationError> {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0);

        let mut path = format!(
            "{}?order=scheduled_at.desc&limit={}&offset={}",
            CONSULTATIONS_PATH, limit, offset
        );
        if let Some(status) = query.status {
            path.push_str(&format!("&status=eq.{}", status));
        }

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        parse_rows(rows)
    }

    /// Walks every page of `list_all` until PostgREST returns a short page.
    pub async fn list_all_pages(
        &self,
        status: Option<ConsultationStatus>,
        auth_token: &str,
    ) -> Result<Vec<Consultation>, ConsultationError> {
        let mut consultations = Vec::new();
        let mut offset = 0;

        loop {
            let query = ConsultationListQuery {
                status,
                limit: Some(MAX_PAGE_SIZE),
                offset: Some(offset),
            };
            let page = self.list_all(&query, auth_token).await?;
            let fetched = page.len() as u32;
            consultations.extend(page);

            if fetched < MAX_PAGE_SIZE {
                break;
            }
            offset += MAX_PAGE_SIZE;
        }

        debug!("Fetched {} consultations across all pages", consultations.len());
        Ok(consultations)
    }

    /// Moves the row from `from` to `to` only if it is still in `from`.
    pub async fn update_status(
        &self,
        consultation_id: &str,
        from: ConsultationStatus,
        to: ConsultationStatus,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        self.patch(
            consultation_id,
            &format!("status=eq.{}", from),
            json!({
                "status": to,
                "updated_at": Utc::now().to_rfc3339()
            }),
            auth_token,
        )
        .await?
        .ok_or(ConsultationError::InvalidStatusTransition { from, to })
    }

    pub async fn save_prescription(
        &self,
        consultation_id: &str,
        prescription: &Prescription,
        status: ConsultationStatus,
        auth_token: &str,
    ) -> Result<Consultation, ConsultationError> {
        self.patch(
            consultation_id,
            "prescription=is.null&status=neq.cancelled",
            json!({
                "prescription": prescription,
                "status": status,
                "updated_at": Utc::now().to_rfc3339()
            }),
            auth_token,
        )
        .await?
        .ok_or(ConsultationError::PrescriptionAlreadyIssued)
    }

    /// Conditional PATCH: `guard` is extra PostgREST filters the row must still
    /// satisfy. `None` means no row matched, i.e. a concurrent write won.
    async fn patch(
        &self,
        consultation_id: &str,
        guard: &str,
        body: Value,
        auth_token: &str,
    ) -> Result<Option<Consultation>, ConsultationError> {
        let path = format!(
            "{}?id=eq.{}&{}",
            CONSULTATIONS_PATH,
            urlencoding::encode(consultation_id),
            guard
        );

        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value(row).map_err(ConsultationError::from))
            .transpose()
    }
}

/// Escapes LIKE metacharacters so an email is never treated as a pattern.
/// PostgREST also reads `*` as `%` inside `ilike`.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_' | '*') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn first_row(rows: Vec<Value>) -> Result<Consultation, ConsultationError> {
    let row = rows.into_iter().next().ok_or(ConsultationError::NotFound)?;
    Ok(serde_json::from_value(row)?)
}

fn parse_rows(rows: Vec<Value>) -> Result<Vec<Consultation>, ConsultationError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(ConsultationError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralises_wildcards() {
        assert_eq!(escape_like("sarah@example.com"), "sarah@example.com");
        assert_eq!(escape_like("s_rah@example.com"), r"s\_rah@example.com");
        assert_eq!(escape_like("100%*@x.io"), r"100\%\*@x.io");
    }
}
