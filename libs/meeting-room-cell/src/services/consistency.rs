// libs/meeting-room-cell/src/services/consistency.rs
//
// Compares meeting URLs already stored on consultation rows with the canonical
// derivation. Rows written by an older slicing scheme show up as mismatches.

use tracing::{debug, warn};

use consultation_cell::models::Consultation;

use crate::models::{RoomAuditEntry, RoomAuditReport, RoomAuditStatus};
use crate::services::allocator::{room_code_from_url, MeetingRoomAllocator};

#[derive(Debug, Default)]
pub struct RoomConsistencyService {
    allocator: MeetingRoomAllocator,
}

impl RoomConsistencyService {
    pub fn new() -> Self {
        Self {
            allocator: MeetingRoomAllocator::new(),
        }
    }

    pub fn check(&self, consultation: &Consultation) -> RoomAuditEntry {
        let expected = self
            .allocator
            .derive(&consultation.id, &consultation.patient_email)
            .room_id;

        let (status, found) = match consultation.meeting_url.as_deref().map(str::trim) {
            None | Some("") => (RoomAuditStatus::MissingUrl, None),
            Some(url) => match room_code_from_url(url) {
                None => (RoomAuditStatus::Unparseable, None),
                Some(code) if code == expected => (RoomAuditStatus::Consistent, Some(code)),
                Some(code) => (RoomAuditStatus::Mismatched, Some(code)),
            },
        };

        RoomAuditEntry {
            consultation_id: consultation.id.clone(),
            status,
            expected_room_id: expected,
            found_room_id: found,
        }
    }

    pub fn audit(&self, consultations: &[Consultation]) -> RoomAuditReport {
        let mut report = RoomAuditReport {
            total: consultations.len(),
            ..RoomAuditReport::default()
        };

        for consultation in consultations {
            let entry = self.check(consultation);
            match entry.status {
                RoomAuditStatus::Consistent => {
                    report.consistent += 1;
                    continue;
                }
                RoomAuditStatus::Mismatched => {
                    warn!(
                        "Consultation {} stores room {:?}, derived room is {}",
                        entry.consultation_id, entry.found_room_id, entry.expected_room_id
                    );
                    report.mismatched += 1;
                }
                RoomAuditStatus::MissingUrl => report.missing_url += 1,
                RoomAuditStatus::Unparseable => report.unparseable += 1,
            }
            report.findings.push(entry);
        }

        debug!(
            "Room audit: {} total, {} consistent, {} mismatched",
            report.total, report.consistent, report.mismatched
        );

        report
    }
}
