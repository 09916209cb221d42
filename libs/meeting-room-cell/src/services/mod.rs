// libs/meeting-room-cell/src/services/mod.rs

pub mod allocator;
pub mod cache;
pub mod consistency;
pub mod meeting;

pub use allocator::{derive_room_code, derive_room_url, room_code_from_url, MeetingRoomAllocator};
pub use cache::MeetingRoomCache;
pub use consistency::RoomConsistencyService;
pub use meeting::MeetingLinkService;
