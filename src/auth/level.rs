use crate::shared::serde_ext::parse_via_string;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthLevel {
    BaseUser = 0,
    Creator = 1,
    Moderator = 2,
    Admin = 3,
    SuperAdmin = 4,
}

impl AuthLevel {
    pub const ALL: [AuthLevel; 5] = [
        AuthLevel::BaseUser,
        AuthLevel::Creator,
        AuthLevel::Moderator,
        AuthLevel::Admin,
        AuthLevel::SuperAdmin,
    ];

    pub fn from_level(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(Self::BaseUser),
            1 => Ok(Self::Creator),
            2 => Ok(Self::Moderator),
            3 => Ok(Self::Admin),
            4 => Ok(Self::SuperAdmin),
            other => Err(format!("auth level must be in range 0..=4; got {other}")),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        if let Ok(value) = normalized.parse::<u8>() {
            return Self::from_level(value);
        }
        match normalized.as_str() {
            "base_user" | "base" => Ok(Self::BaseUser),
            "creator" => Ok(Self::Creator),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(
                "auth level must be 0..=4 or one of: base_user, creator, moderator, admin, super_admin"
                    .to_string(),
            ),
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BaseUser => "base_user",
            Self::Creator => "creator",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    pub fn is_at_least(self, threshold: AuthLevel) -> bool {
        self >= threshold
    }
}

impl std::fmt::Display for AuthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuthLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_via_string(deserializer, "auth level", Self::parse)
    }
}
