use super::AuthLevel;
use crate::shared::ids::UserId;
use serde::{Deserialize, Serialize};

/// The caller of every engine operation. Nothing reads authorization state from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: UserId,
    pub auth_level: AuthLevel,
    pub account_verified: bool,
}

impl Actor {
    pub fn new(id: UserId, auth_level: AuthLevel) -> Self {
        Self {
            id,
            auth_level,
            account_verified: true,
        }
    }

    pub fn unverified(mut self) -> Self {
        self.account_verified = false;
        self
    }

    pub fn is_super_admin(&self) -> bool {
        self.auth_level.is_at_least(AuthLevel::SuperAdmin)
    }

    pub fn is_admin(&self) -> bool {
        self.auth_level.is_at_least(AuthLevel::Admin)
    }
}
