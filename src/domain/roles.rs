use crate::shared::serde_ext::parse_via_string;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tag roles, stored in canonical upper-case form and shown in display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Organizer,
    Dj,
    Mc,
    Judge,
    Photographer,
    Videographer,
    Designer,
    TeamMember,
    Dancer,
    Winner,
    Choreographer,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 12] = [
        Role::Organizer,
        Role::Dj,
        Role::Mc,
        Role::Judge,
        Role::Photographer,
        Role::Videographer,
        Role::Designer,
        Role::TeamMember,
        Role::Dancer,
        Role::Winner,
        Role::Choreographer,
        Role::Teacher,
    ];

    pub fn as_canonical(self) -> &'static str {
        match self {
            Self::Organizer => "ORGANIZER",
            Self::Dj => "DJ",
            Self::Mc => "MC",
            Self::Judge => "JUDGE",
            Self::Photographer => "PHOTOGRAPHER",
            Self::Videographer => "VIDEOGRAPHER",
            Self::Designer => "DESIGNER",
            Self::TeamMember => "TEAM_MEMBER",
            Self::Dancer => "DANCER",
            Self::Winner => "WINNER",
            Self::Choreographer => "CHOREOGRAPHER",
            Self::Teacher => "TEACHER",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Organizer => "Organizer",
            Self::Dj => "DJ",
            Self::Mc => "MC",
            Self::Judge => "Judge",
            Self::Photographer => "Photographer",
            Self::Videographer => "Videographer",
            Self::Designer => "Designer",
            Self::TeamMember => "Team Member",
            Self::Dancer => "Dancer",
            Self::Winner => "Winner",
            Self::Choreographer => "Choreographer",
            Self::Teacher => "Teacher",
        }
    }

    /// Accepts either spelling: `Team Member`, `team-member` and `TEAM_MEMBER` are the same role.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let canonical = raw
            .trim()
            .to_ascii_uppercase()
            .replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|role| role.as_canonical() == canonical)
            .ok_or_else(|| format!("unknown role `{}`", raw.trim()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_canonical())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_via_string(deserializer, "role", Self::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    Event,
    Section,
    Video,
    /// Validates workshop role assignments; no `TagTarget` resolves to it.
    Workshop,
}

const EVENT_ROLES: &[Role] = &[
    Role::Organizer,
    Role::Dj,
    Role::Mc,
    Role::Judge,
    Role::Photographer,
    Role::Videographer,
    Role::Designer,
    Role::TeamMember,
];
const SECTION_ROLES: &[Role] = &[Role::Dancer, Role::Winner, Role::Judge];
const VIDEO_ROLES: &[Role] = &[Role::Dancer, Role::Winner, Role::Choreographer];
const WORKSHOP_ROLES: &[Role] = &[Role::Organizer, Role::Teacher];

impl RoleScope {
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Self::Event => EVENT_ROLES,
            Self::Section => SECTION_ROLES,
            Self::Video => VIDEO_ROLES,
            Self::Workshop => WORKSHOP_ROLES,
        }
    }

    pub fn allows(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Section => "section",
            Self::Video => "video",
            Self::Workshop => "workshop",
        }
    }

    pub fn validate(self, role: Role) -> Result<(), String> {
        if self.allows(role) {
            return Ok(());
        }
        let allowed = self
            .allowed_roles()
            .iter()
            .map(|value| value.display_name())
            .collect::<Vec<_>>()
            .join(", ");
        Err(format!(
            "role `{}` is not allowed on a {}; expected one of: {allowed}",
            role.display_name(),
            self.as_str()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_display_and_canonical_spellings() {
        assert_eq!(Role::parse("Team Member"), Ok(Role::TeamMember));
        assert_eq!(Role::parse("team-member"), Ok(Role::TeamMember));
        assert_eq!(Role::parse(" dancer "), Ok(Role::Dancer));
        assert!(Role::parse("Bouncer").is_err());
    }

    #[test]
    fn winner_is_a_section_and_video_role_only() {
        assert!(RoleScope::Section.allows(Role::Winner));
        assert!(RoleScope::Video.allows(Role::Winner));
        assert!(!RoleScope::Event.allows(Role::Winner));
        assert!(!RoleScope::Workshop.allows(Role::Winner));
    }
}
