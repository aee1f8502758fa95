//! Permission model, access tokens, and role-based route guarding.
//!
//! Permissions come from a fixed set. Each role is granted a default set,
//! and an [`AccessToken`] carries the permissions actually issued to a
//! session together with its expiry and revocation state.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::{Timestamp, UserId};

// ---------------------------------------------------------------------------
// Permission
// ---------------------------------------------------------------------------

/// A single capability that can be granted to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewChallenges,
    SubmitSolutions,
    ManageTeam,
    CreateChallenges,
    ReviewSubmissions,
    ViewAnalytics,
    ManageUsers,
    ManagePlatform,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::ViewChallenges,
        Permission::SubmitSolutions,
        Permission::ManageTeam,
        Permission::CreateChallenges,
        Permission::ReviewSubmissions,
        Permission::ViewAnalytics,
        Permission::ManageUsers,
        Permission::ManagePlatform,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ViewChallenges => "view_challenges",
            Permission::SubmitSolutions => "submit_solutions",
            Permission::ManageTeam => "manage_team",
            Permission::CreateChallenges => "create_challenges",
            Permission::ReviewSubmissions => "review_submissions",
            Permission::ViewAnalytics => "view_analytics",
            Permission::ManageUsers => "manage_users",
            Permission::ManagePlatform => "manage_platform",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown permission: {s}")))
    }
}

impl Role {
    /// Permissions granted to the role when no explicit token is issued.
    pub fn default_permissions(self) -> BTreeSet<Permission> {
        use Permission::*;

        let granted: &[Permission] = match self {
            Role::Participant => &[ViewChallenges, SubmitSolutions, ManageTeam],
            Role::Partner => &[
                ViewChallenges,
                CreateChallenges,
                ReviewSubmissions,
                ViewAnalytics,
            ],
            Role::Admin => &Permission::ALL,
        };
        granted.iter().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// AccessToken
// ---------------------------------------------------------------------------

/// Permissions issued to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub role: Role,
    pub permissions: BTreeSet<Permission>,
    pub expires_at: Option<Timestamp>,
    #[serde(default)]
    pub revoked: bool,
}

impl AccessToken {
    /// Issue a non-expiring token carrying the role's default permissions.
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            permissions: role.default_permissions(),
            expires_at: None,
            revoked: false,
        }
    }

    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// A token is active until it is revoked or its expiry passes.
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.revoked && self.expires_at.map_or(true, |at| now < at)
    }

    /// Inactive tokens allow nothing.
    pub fn allows(&self, permission: Permission, now: Timestamp) -> bool {
        self.is_active(now) && self.permissions.contains(&permission)
    }

    /// Like [`allows`](Self::allows) but as a `Result` for `?` call sites.
    pub fn require(&self, permission: Permission, now: Timestamp) -> Result<(), CoreError> {
        if !self.is_active(now) {
            return Err(CoreError::Unauthorized("Access token expired or revoked".into()));
        }
        if !self.permissions.contains(&permission) {
            return Err(CoreError::Forbidden(format!(
                "Permission `{permission}` required"
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Route guard
// ---------------------------------------------------------------------------

/// The authenticated identity a route guard evaluates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub role: Role,
}

/// Outcome of guarding a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
    /// Signed in with the wrong role: send the user to their own dashboard.
    RedirectTo(&'static str),
}

pub const LOGIN_PATH: &str = "/login";

/// Decide whether `identity` may enter a route restricted to
/// `required_roles`. An empty slice admits any signed-in user.
pub fn guard_route(identity: Option<&SessionIdentity>, required_roles: &[Role]) -> RouteDecision {
    let Some(identity) = identity else {
        return RouteDecision::RedirectToLogin;
    };

    if required_roles.is_empty() || required_roles.contains(&identity.role) {
        RouteDecision::Allow
    } else {
        RouteDecision::RedirectTo(identity.role.home_path())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
