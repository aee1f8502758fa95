//! Platform roles.
//!
//! The names must match the `role` custom claim set on user accounts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_PARTICIPANT: &str = "participant";
pub const ROLE_PARTNER: &str = "partner";
pub const ROLE_ADMIN: &str = "admin";

/// The role an account holds on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Competes in challenges, alone or in a team.
    Participant,
    /// Corporate partner that sponsors and reviews challenges.
    Partner,
    /// Platform administrator.
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Participant => ROLE_PARTICIPANT,
            Role::Partner => ROLE_PARTNER,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Landing path for the role's dashboard.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Participant => "/dashboard",
            Role::Partner => "/partner",
            Role::Admin => "/admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_PARTICIPANT => Ok(Role::Participant),
            ROLE_PARTNER => Ok(Role::Partner),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("Unknown role: {other}"))),
        }
    }
}
