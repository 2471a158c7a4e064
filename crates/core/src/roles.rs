//! User roles.
//!
//! Stored as upper-case text in `users.role` and embedded in access-token
//! claims under the same spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "USER";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_PMO: &str = "PMO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
    Pmo,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Pmo];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => ROLE_USER,
            Self::Admin => ROLE_ADMIN,
            Self::Pmo => ROLE_PMO,
        }
    }

    /// Admins and the PMO office manage the team roster and departments.
    pub fn can_manage(self) -> bool {
        matches!(self, Self::Admin | Self::Pmo)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("Invalid role '{s}'. Must be one of: {ROLE_USER}, {ROLE_ADMIN}, {ROLE_PMO}")
            })
    }
}
