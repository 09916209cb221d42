// libs/meeting-room-cell/src/services/cache.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{MeetingRoom, MeetingRoomError, RoomCacheStats};
use crate::services::allocator::{room_code_from_url, MeetingRoomAllocator};

struct CachedRoom {
    patient_email: String,
    room: MeetingRoom,
}

/// Look-aside memo of derived rooms keyed by consultation id.
///
/// Owned by whoever serves consultations (the API process creates one at
/// startup). Entries remember the email they were derived from, so a lookup
/// with a different email recomputes instead of returning a stale room.
pub struct MeetingRoomCache {
    enabled: bool,
    allocator: MeetingRoomAllocator,
    rooms: RwLock<HashMap<String, CachedRoom>>,
    hits: AtomicU64,
    misses: AtomicU64,
    rehydrated: AtomicU64,
}

impl MeetingRoomCache {
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// Every lookup derives cold; nothing is stored.
    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    pub fn from_config(config: &AppConfig) -> Self {
        if !config.meeting_room_cache_enabled {
            info!("Meeting room cache disabled by configuration");
        }
        Self::with_enabled(config.meeting_room_cache_enabled)
    }

    fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            allocator: MeetingRoomAllocator::new(),
            rooms: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            rehydrated: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get_or_derive(&self, consultation_id: &str, patient_email: &str) -> MeetingRoom {
        if !self.enabled {
            return self.allocator.derive(consultation_id, patient_email);
        }

        {
            let rooms = self.rooms.read().await;
            if let Some(cached) = rooms.get(consultation_id) {
                if cached.patient_email == patient_email {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return cached.room.clone();
                }
                debug!(
                    "Cached room for consultation {} was derived from a different email, recomputing",
                    consultation_id
                );
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let room = self.allocator.derive(consultation_id, patient_email);

        // Concurrent misses derive the same value, so last write wins.
        self.rooms.write().await.insert(
            consultation_id.to_string(),
            CachedRoom {
                patient_email: patient_email.to_string(),
                room: room.clone(),
            },
        );

        room
    }

    pub async fn get(&self, consultation_id: &str) -> Option<MeetingRoom> {
        self.rooms
            .read()
            .await
            .get(consultation_id)
            .map(|cached| cached.room.clone())
    }

    /// Seeds the cache from a previously stored meeting URL.
    ///
    /// The stored code must equal the derived one; a URL written by another
    /// slicing scheme is reported instead of being trusted.
    pub async fn rehydrate(
        &self,
        consultation_id: &str,
        patient_email: &str,
        stored_url: &str,
    ) -> Result<MeetingRoom, MeetingRoomError> {
        let found = room_code_from_url(stored_url).ok_or_else(|| MeetingRoomError::InvalidMeetingUrl {
            url: stored_url.to_string(),
        })?;

        let room = self.allocator.derive(consultation_id, patient_email);
        if found != room.room_id {
            warn!(
                "Stored room {} for consultation {} does not match derived room {}",
                found, consultation_id, room.room_id
            );
            return Err(MeetingRoomError::RoomCodeMismatch {
                expected: room.room_id,
                found,
            });
        }

        if self.enabled {
            self.rooms.write().await.insert(
                consultation_id.to_string(),
                CachedRoom {
                    patient_email: patient_email.to_string(),
                    room: room.clone(),
                },
            );
            self.rehydrated.fetch_add(1, Ordering::Relaxed);
        }

        Ok(room)
    }

    pub async fn invalidate(&self, consultation_id: &str) -> bool {
        self.rooms.write().await.remove(consultation_id).is_some()
    }

    /// Drops every entry and returns how many were removed.
    pub async fn clear(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        let removed = rooms.len();
        rooms.clear();
        info!("Cleared {} cached meeting rooms", removed);
        removed
    }

    pub async fn stats(&self) -> RoomCacheStats {
        RoomCacheStats {
            enabled: self.enabled,
            entries: self.rooms.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            rehydrated: self.rehydrated.load(Ordering::Relaxed),
        }
    }
}

impl Default for MeetingRoomCache {
    fn default() -> Self {
        Self::new()
    }
}
