use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Admin,
    Moderator,
    User,
}

impl AppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::User => "user",
        }
    }
}

/// A row of `user_roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: AppRole,
}

/// The roles held by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    roles: HashSet<AppRole>,
}

impl RoleSet {
    pub fn new(roles: impl IntoIterator<Item = AppRole>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    /// Collect the roles of `user_id`, ignoring rows that belong to anyone else.
    pub fn from_rows(user_id: Uuid, rows: &[UserRole]) -> Self {
        Self::new(rows.iter().filter(|r| r.user_id == user_id).map(|r| r.role))
    }

    pub fn has_role(&self, role: AppRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(AppRole::Admin)
    }

    pub fn is_moderator(&self) -> bool {
        self.has_role(AppRole::Moderator)
    }

    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.is_moderator()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Roles in a stable order for display.
    pub fn sorted(&self) -> Vec<AppRole> {
        let mut roles: Vec<AppRole> = self.roles.iter().copied().collect();
        roles.sort_by_key(|r| r.as_str());
        roles
    }
}
