use super::audit::AuditLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Operator,
    Finance,
    Auditor,
    System,
}

impl Role {
    /// Roles permitted on every edge of every order type.
    pub fn is_globally_privileged(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Finance => "finance",
            Self::Auditor => "auditor",
            Self::System => "system",
        };
        f.write_str(s)
    }
}

/// An actor already authenticated upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    pub audit_level: Option<AuditLevel>,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            audit_level: None,
        }
    }

    pub fn auditor(id: impl Into<String>, level: u8) -> Self {
        Self::new(id, Role::Auditor).with_audit_level(AuditLevel::new(level))
    }

    pub fn with_audit_level(mut self, level: AuditLevel) -> Self {
        self.audit_level = Some(level);
        self
    }
}
