use std::sync::Arc;

use assert_matches::assert_matches;

use meeting_room_cell::{derive_room_url, MeetingRoomAllocator, MeetingRoomCache, MeetingRoomError};
use shared_utils::test_utils::TestConfig;

#[tokio::test]
async fn test_miss_then_hit_returns_same_room() {
    let cache = MeetingRoomCache::new();

    let cold = MeetingRoomAllocator::new().derive("cons_1", "sarah@example.com");
    let first = cache.get_or_derive("cons_1", "sarah@example.com").await;
    let second = cache.get_or_derive("cons_1", "sarah@example.com").await;

    assert_eq!(first, cold);
    assert_eq!(second, cold);

    let stats = cache.stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn test_changed_email_recomputes() {
    let cache = MeetingRoomCache::new();

    cache.get_or_derive("cons_1", "old@example.com").await;
    let room = cache.get_or_derive("cons_1", "new@example.com").await;

    assert_eq!(room.url, derive_room_url("cons_1", "new@example.com"));
    assert_eq!(cache.get("cons_1").await, Some(room));
    assert_eq!(cache.stats().await.misses, 2);
}

#[tokio::test]
async fn test_disabled_cache_derives_cold() {
    let mut config = TestConfig::default();
    config.meeting_room_cache_enabled = false;
    let cache = MeetingRoomCache::from_config(&config.to_app_config());

    let room = cache.get_or_derive("cons_1", "sarah@example.com").await;

    assert!(!cache.is_enabled());
    assert_eq!(room.url, derive_room_url("cons_1", "sarah@example.com"));
    assert_eq!(cache.get("cons_1").await, None);
    assert_eq!(cache.stats().await.entries, 0);
}

#[tokio::test]
async fn test_rehydrate_accepts_matching_url() {
    let cache = MeetingRoomCache::new();

    let room = cache
        .rehydrate("cons_1", "a@b.com", "https://meet.google.com/000-0ig4-dzo")
        .await
        .unwrap();

    assert_eq!(room.room_id, "000-0ig4-dzo");
    assert_eq!(cache.get("cons_1").await, Some(room));
    assert_eq!(cache.stats().await.rehydrated, 1);
}

#[tokio::test]
async fn test_rehydrate_flags_legacy_slicing() {
    let cache = MeetingRoomCache::new();

    let result = cache
        .rehydrate("cons_1", "a@b.com", "https://meet.google.com/000-0ig4-dzoq")
        .await;

    assert_matches!(
        result,
        Err(MeetingRoomError::RoomCodeMismatch { expected, found })
            if expected == "000-0ig4-dzo" && found == "000-0ig4-dzoq"
    );
    assert_eq!(cache.get("cons_1").await, None);
}

#[tokio::test]
async fn test_rehydrate_rejects_non_meeting_url() {
    let cache = MeetingRoomCache::new();

    let result = cache.rehydrate("cons_1", "a@b.com", "not a url").await;

    assert_matches!(result, Err(MeetingRoomError::InvalidMeetingUrl { .. }));
}

#[tokio::test]
async fn test_invalidate_and_clear() {
    let cache = MeetingRoomCache::new();
    cache.get_or_derive("cons_1", "a@b.com").await;
    cache.get_or_derive("cons_2", "a@b.com").await;
    cache.get_or_derive("cons_3", "a@b.com").await;

    assert!(cache.invalidate("cons_1").await);
    assert!(!cache.invalidate("cons_1").await);
    assert_eq!(cache.clear().await, 2);
    assert_eq!(cache.stats().await.entries, 0);
}

#[tokio::test]
async fn test_concurrent_lookups_agree() {
    let cache = Arc::new(MeetingRoomCache::new());
    let expected = derive_room_url("test-consultation-1", "testpatient@example.com");

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_derive("test-consultation-1", "testpatient@example.com")
                    .await
                    .url
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), expected);
    }

    let stats = cache.stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits + stats.misses, 16);
}
