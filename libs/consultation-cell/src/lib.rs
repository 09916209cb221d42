//! # Consultation Cell
//!
//! Consultation records for booked nephrology video consultations, backed by
//! the Supabase `consultations` table.
//!
//! - `services/store.rs` reads and writes consultation rows
//! - `services/lifecycle.rs` guards status transitions
//! - `services/prescription.rs` attaches a prescription and completes the consultation
//!
//! ## API Endpoints
//!
//! - `GET /` - List consultations (patients see their own)
//! - `GET /{id}` - Get one consultation
//! - `PATCH /{id}/status` - Change status (doctor/admin)
//! - `POST /{id}/prescription` - Issue a prescription (doctor/admin)

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AttachPrescriptionRequest, Consultation, ConsultationError, ConsultationListQuery,
    ConsultationStatus, Medication, Prescription, UpdateStatusRequest,
};

pub use services::{ConsultationLifecycleService, ConsultationStore, PrescriptionWorkflow};

pub use router::consultation_routes;
