//! Navigation context for notifications and the legacy message-tail codec.
//!
//! Older notifications carry their navigation target inside `message` as a
//! pipe-delimited tail: `You were tagged|eventId:E1|sectionId:S1`. The tail is
//! decoded here and nowhere else; decoding never fails, it only yields `None`.

use serde::{Deserialize, Serialize};

const EVENT_KEY: &str = "eventId:";
const SECTION_KEY: &str = "sectionId:";
const VIDEO_KEY: &str = "videoId:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavigationContext {
    EventOnly {
        event_id: String,
    },
    EventSection {
        event_id: String,
        section_id: String,
    },
    EventSectionVideo {
        event_id: String,
        section_id: String,
        video_id: String,
    },
}

impl NavigationContext {
    /// Picks the most specific shape the parts support. A video without its section
    /// cannot be addressed, so it falls back to the event.
    pub fn from_parts(
        event_id: impl Into<String>,
        section_id: Option<String>,
        video_id: Option<String>,
    ) -> Self {
        let event_id = event_id.into();
        match (section_id, video_id) {
            (Some(section_id), Some(video_id)) => Self::EventSectionVideo {
                event_id,
                section_id,
                video_id,
            },
            (Some(section_id), None) => Self::EventSection {
                event_id,
                section_id,
            },
            (None, _) => Self::EventOnly { event_id },
        }
    }

    pub fn event_id(&self) -> &str {
        match self {
            Self::EventOnly { event_id }
            | Self::EventSection { event_id, .. }
            | Self::EventSectionVideo { event_id, .. } => event_id,
        }
    }

    pub fn event_only(&self) -> Self {
        Self::EventOnly {
            event_id: self.event_id().to_string(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::EventOnly { event_id } => format!("/events/{}", encode(event_id)),
            Self::EventSection {
                event_id,
                section_id,
            } => format!(
                "/events/{}/sections/{}",
                encode(event_id),
                encode(section_id)
            ),
            Self::EventSectionVideo {
                event_id,
                section_id,
                video_id,
            } => format!(
                "/events/{}/sections/{}/videos/{}",
                encode(event_id),
                encode(section_id),
                encode(video_id)
            ),
        }
    }

    pub fn encode_legacy_tail(&self) -> String {
        match self {
            Self::EventOnly { event_id } => format!("|{EVENT_KEY}{event_id}"),
            Self::EventSection {
                event_id,
                section_id,
            } => format!("|{EVENT_KEY}{event_id}|{SECTION_KEY}{section_id}"),
            Self::EventSectionVideo {
                event_id,
                section_id,
                video_id,
            } => format!(
                "|{EVENT_KEY}{event_id}|{SECTION_KEY}{section_id}|{VIDEO_KEY}{video_id}"
            ),
        }
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Reads `key:value` segments in any order; the first non-empty value per key wins.
pub fn decode_legacy_tail(message: &str) -> Option<NavigationContext> {
    let mut event_id = None;
    let mut section_id = None;
    let mut video_id = None;

    for segment in message.split('|') {
        let segment = segment.trim();
        if let Some(value) = segment.strip_prefix(EVENT_KEY) {
            take_first(&mut event_id, value);
        } else if let Some(value) = segment.strip_prefix(SECTION_KEY) {
            take_first(&mut section_id, value);
        } else if let Some(value) = segment.strip_prefix(VIDEO_KEY) {
            take_first(&mut video_id, value);
        }
    }

    event_id.map(|event_id| NavigationContext::from_parts(event_id, section_id, video_id))
}

fn take_first(slot: &mut Option<String>, value: &str) {
    let value = value.trim();
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

/// The human-readable part of a message, without any navigation tail.
pub fn strip_legacy_tail(message: &str) -> &str {
    let mut end = message.len();
    for key in [EVENT_KEY, SECTION_KEY, VIDEO_KEY] {
        if let Some(position) = message.find(&format!("|{key}")) {
            end = end.min(position);
        }
    }
    &message[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_round_trips_through_the_decoder() {
        let context = NavigationContext::EventSectionVideo {
            event_id: "e1".to_string(),
            section_id: "s1".to_string(),
            video_id: "v1".to_string(),
        };
        let message = format!("You were tagged{}", context.encode_legacy_tail());
        assert_eq!(decode_legacy_tail(&message), Some(context));
        assert_eq!(strip_legacy_tail(&message), "You were tagged");
    }

    #[test]
    fn unusual_legacy_ids_are_percent_encoded_in_paths() {
        let context = NavigationContext::from_parts("summer jam/2019", None, None);
        assert_eq!(context.path(), "/events/summer%20jam%2F2019");
    }
}
