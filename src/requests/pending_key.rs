use crate::domain::PendingKey;
use sha2::{Digest, Sha256};

/// Stable fingerprint of the pending-uniqueness tuple; absent parts hash as empty fields.
pub fn compute_pending_key(key: &PendingKey) -> String {
    let mut hasher = Sha256::new();
    let parts = [
        key.kind.as_str(),
        key.sender_id.as_str(),
        key.target_user_id.as_str(),
        key.event_id.as_str(),
        key.video_id.as_ref().map_or("", |value| value.as_str()),
        key.section_id.as_ref().map_or("", |value| value.as_str()),
        key.role.map_or("", |role| role.as_canonical()),
    ];
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0]);
    }
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RequestKind, Role, TagTarget};
    use crate::shared::ids::{EventId, SectionId, UserId, VideoId};

    fn user(raw: &str) -> UserId {
        UserId::parse(raw).expect("user id")
    }

    #[test]
    fn section_and_video_with_same_id_do_not_collide() {
        let event = EventId::parse("e1").expect("event id");
        let by_section = TagTarget::Section {
            event_id: event.clone(),
            section_id: SectionId::parse("x1").expect("section id"),
        };
        let by_video = TagTarget::Video {
            event_id: event,
            video_id: VideoId::parse("x1").expect("video id"),
        };
        let a = compute_pending_key(&PendingKey::tagging(
            &user("u1"),
            &user("u1"),
            &by_section,
            Role::Dancer,
        ));
        let b = compute_pending_key(&PendingKey::tagging(
            &user("u1"),
            &user("u1"),
            &by_video,
            Role::Dancer,
        ));
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn request_kind_is_part_of_the_key() {
        let event = EventId::parse("e1").expect("event id");
        let team = PendingKey::self_request(RequestKind::TeamMember, &user("u1"), &event);
        let owner = PendingKey::self_request(RequestKind::Ownership, &user("u1"), &event);
        assert_ne!(compute_pending_key(&team), compute_pending_key(&owner));
    }
}
