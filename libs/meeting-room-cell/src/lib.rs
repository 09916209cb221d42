// libs/meeting-room-cell/src/lib.rs
//! # Meeting Room Cell
//!
//! Derives the video-meeting room for each consultation and serves the
//! "Join Meeting" links shown to patients and to the clinic.
//!
//! A room is a pure function of the consultation id and the patient's email,
//! so the patient view and the doctor/admin view resolve to the identical URL
//! without coordinating through the database:
//!
//! ```rust
//! use meeting_room_cell::services::derive_room_url;
//!
//! let patient_view = derive_room_url("test-consultation-1", "testpatient@example.com");
//! let doctor_view = derive_room_url("test-consultation-1", "testpatient@example.com");
//! assert_eq!(patient_view, doctor_view);
//! assert_eq!(patient_view, "https://meet.google.com/000-0a9s-4b9");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------+
//! |                 Meeting Room Cell                   |
//! +-----------------------------------------------------+
//! |  handlers.rs     |  HTTP endpoint handlers          |
//! |  router.rs       |  Route definitions + state       |
//! |  models.rs       |  Data structures & errors        |
//! |  services/       |  Business logic layer            |
//! |    allocator.rs  |  Room code derivation            |
//! |    cache.rs      |  Look-aside room cache           |
//! |    meeting.rs    |  Patient / clinic join links     |
//! |    consistency.rs|  Stored URL audit                |
//! +-----------------------------------------------------+
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /patient/consultations/{id}` - Patient join link
//! - `GET /admin/consultations/{id}` - Doctor/admin join link
//! - `POST /rooms/derive` - Derive a room directly (doctor/admin)
//! - `POST /rooms/rehydrate` - Seed the cache from a stored URL (doctor/admin)
//! - `GET /rooms/cache` / `DELETE /rooms/cache` - Cache stats / clear (admin)
//! - `GET /admin/audit` - Audit stored meeting URLs (admin)

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    MeetingAudience, MeetingLinkResponse, MeetingRoom, MeetingRoomError, RoomAuditReport,
    RoomAuditStatus, RoomCacheStats,
};

pub use services::{
    derive_room_code, derive_room_url, room_code_from_url, MeetingLinkService,
    MeetingRoomAllocator, MeetingRoomCache, RoomConsistencyService,
};

pub use router::{meeting_room_routes, MeetingRoomState};
