use getrandom::getrandom;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const GENERATED_SUFFIX_WIDTH: usize = 10;
const MAX_IDENTIFIER_LEN: usize = 128;

pub fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "{kind} must be at most {MAX_IDENTIFIER_LEN} characters"
        ));
    }
    if value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Ok(());
    }
    Err(format!(
        "{kind} must use only ASCII letters, digits, '-' or '_'"
    ))
}

fn base36_encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut chars = Vec::new();
    while value > 0 {
        chars.push(BASE36_ALPHABET[(value % 36) as usize] as char);
        value /= 36;
    }
    chars.iter().rev().collect()
}

fn base36_encode_fixed_u64(mut value: u64, width: usize) -> String {
    let mut chars = vec!['0'; width];
    for idx in (0..width).rev() {
        chars[idx] = BASE36_ALPHABET[(value % 36) as usize] as char;
        value /= 36;
    }
    chars.into_iter().collect()
}

/// Builds `<prefix>-<base36 seconds>-<random suffix>`; always a valid identifier.
pub fn generate_identifier(prefix: &str, now: i64) -> Result<String, String> {
    let timestamp = u64::try_from(now)
        .map_err(|_| "identifier generation requires a non-negative timestamp".to_string())?;
    let mut bytes = [0_u8; 8];
    getrandom(&mut bytes).map_err(|err| format!("failed to generate id randomness: {err}"))?;
    let sample = u64::from_le_bytes(bytes);
    Ok(format!(
        "{prefix}-{}-{}",
        base36_encode_u64(timestamp),
        base36_encode_fixed_u64(sample, GENERATED_SUFFIX_WIDTH)
    ))
}

macro_rules! define_id_type {
    ($name:ident, $kind:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, String> {
                validate_identifier_value($kind, raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::parse(raw)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).map_err(|err| {
                    D::Error::custom(format!("invalid {} `{}`: {}", $kind, raw, err))
                })
            }
        }
    };
}

macro_rules! define_generated_id_type {
    ($name:ident, $kind:literal, $prefix:literal) => {
        define_id_type!($name, $kind);

        impl $name {
            pub fn generate(now: i64) -> Result<Self, String> {
                generate_identifier($prefix, now).map(Self)
            }
        }
    };
}

define_id_type!(UserId, "user id");
define_id_type!(EventId, "event id");
define_id_type!(SectionId, "section id");
define_id_type!(BracketId, "bracket id");
define_id_type!(VideoId, "video id");
define_generated_id_type!(RequestId, "request id", "req");
define_generated_id_type!(NotificationId, "notification id", "ntf");
define_generated_id_type!(JobId, "job id", "job");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_identifiers_are_valid_and_prefixed() {
        let id = RequestId::generate(1_700_000_000).expect("generate");
        assert!(id.as_str().starts_with("req-"));
        assert!(RequestId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn negative_timestamps_are_rejected_for_generation() {
        assert!(JobId::generate(-1).is_err());
    }

    #[test]
    fn base36_fixed_width_pads_with_zeros() {
        assert_eq!(base36_encode_fixed_u64(35, 3), "00z");
        assert_eq!(base36_encode_u64(0), "0");
    }
}
