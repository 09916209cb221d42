// libs/meeting-room-cell/src/services/allocator.rs
//
// Deterministic meeting-room derivation.
//
// A room is a pure function of (consultation id, patient email): the patient
// view and the doctor/admin view compute it independently and must always land
// on the same URL without sharing any state.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::MeetingRoom;

pub const MEETING_BASE_URL: &str = "https://meet.google.com/";

/// Base-36 digits kept in a room code before grouping (3-4-3).
const ROOM_CODE_DIGITS: usize = 10;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static ROOM_URL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"meet\.google\.com/([0-9a-z]+(?:-[0-9a-z]+)+)/?(?:[?#].*)?$").ok()
});

/// 32-bit string hash over UTF-16 code units: `hash = hash * 31 + unit`,
/// wrapping on every step like JavaScript's `|0` coercion.
pub fn room_hash(combined: &str) -> i32 {
    combined.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

pub fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(7);
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }

    digits.iter().rev().map(|&d| char::from(d)).collect()
}

/// `xxx-yyyy-zzz` code for a consultation.
///
/// A 32-bit magnitude never needs more than 7 base-36 digits, so the digits are
/// left-padded with `0` to a fixed width before grouping.
pub fn derive_room_code(consultation_id: &str, patient_email: &str) -> String {
    let combined = format!("{}-{}", consultation_id, patient_email);
    let digits = to_base36(room_hash(&combined).unsigned_abs());
    let padded = format!("{:0>width$}", digits, width = ROOM_CODE_DIGITS);

    format!("{}-{}-{}", &padded[0..3], &padded[3..7], &padded[7..10])
}

pub fn derive_room_url(consultation_id: &str, patient_email: &str) -> String {
    format!("{}{}", MEETING_BASE_URL, derive_room_code(consultation_id, patient_email))
}

/// Extracts the trailing `meet.google.com/<code>` room code from a stored URL.
///
/// Any hyphen-grouped lowercase base-36 code is accepted, including codes
/// written by older slicing schemes, so callers can compare them.
pub fn room_code_from_url(url: &str) -> Option<String> {
    let pattern = ROOM_URL_PATTERN.as_ref()?;
    pattern
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|code| code.as_str().to_string())
}

/// Maps consultations to meeting rooms. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeetingRoomAllocator;

impl MeetingRoomAllocator {
    pub fn new() -> Self {
        Self
    }

    pub fn derive(&self, consultation_id: &str, patient_email: &str) -> MeetingRoom {
        let room_id = derive_room_code(consultation_id, patient_email);
        MeetingRoom {
            url: format!("{}{}", MEETING_BASE_URL, room_id),
            room_id,
        }
    }
}
