//! Role model and capability lookup

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Admin role.
///
/// `Superadmin` is the only role the dashboard currently provisions.
/// Adding a role means adding a variant and its capability set here; call
/// sites go through [`Role::can`] and need no changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
}

/// Capabilities a role can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageUsers,
    ManageContent,
    ViewAuditLog,
}

impl Role {
    /// Capability set granted to this role.
    pub fn permissions(self) -> &'static [Capability] {
        match self {
            Role::Superadmin => &[
                Capability::ManageUsers,
                Capability::ManageContent,
                Capability::ViewAuditLog,
            ],
        }
    }

    /// Whether this role holds the given capability.
    pub fn can(self, capability: Capability) -> bool {
        self.permissions().contains(&capability)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
        }
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
        match s {
            "superadmin" => Ok(Role::Superadmin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
