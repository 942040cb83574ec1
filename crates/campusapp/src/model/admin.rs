use chrono::{DateTime, Utc};
use crate::listing::{Choice, RecordFilter, Searchable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{id_from_any, parse_choice, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Admin,
    SuperAdmin,
    Moderator,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::SuperAdmin, Role::Moderator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Moderator => "MODERATOR",
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
        let choices: Vec<(&str, Role)> = Role::ALL.iter().map(|r| (r.as_str(), *r)).collect();
        parse_choice(s, &choices).ok_or_else(|| format!("Unknown role: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    #[default]
    Active,
    Inactive,
}

impl AdminStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatus::Active => "active",
            AdminStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(
            s,
            &[
                ("active", AdminStatus::Active),
                ("inactive", AdminStatus::Inactive),
            ],
        )
        .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    pub manage_users: bool,
    pub manage_content: bool,
    pub manage_settings: bool,
    pub view_reports: bool,
}

impl Permissions {
    /// Permission set a freshly created admin of `role` starts with.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::SuperAdmin => Self {
                manage_users: true,
                manage_content: true,
                manage_settings: true,
                view_reports: true,
            },
            Role::Admin => Self {
                manage_users: true,
                manage_content: true,
                manage_settings: false,
                view_reports: true,
            },
            Role::Moderator => Self {
                manage_content: true,
                ..Self::default()
            },
        }
    }

    pub fn granted(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.manage_users {
            out.push("users");
        }
        if self.manage_content {
            out.push("content");
        }
        if self.manage_settings {
            out.push("settings");
        }
        if self.view_reports {
            out.push("reports");
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRecord {
    #[serde(alias = "_id", deserialize_with = "id_from_any")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: AdminStatus,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for AdminRecord {
    const NOUN: &'static str = "admin";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Searchable for AdminRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.phone.as_str()]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminFilter {
    pub role: Choice<Role>,
    pub status: Choice<AdminStatus>,
}

impl RecordFilter<AdminRecord> for AdminFilter {
    fn admits(&self, record: &AdminRecord) -> bool {
        self.role.admits(&record.role) && self.status.admits(&record.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_server_user() {
        let admin: AdminRecord = serde_json::from_str(
            r#"{"_id": 7, "name": "Ada", "email": "ada@school.test", "role": "SUPER_ADMIN"}"#,
        )
        .unwrap();
        assert_eq!(admin.id, "7");
        assert_eq!(admin.role, Role::SuperAdmin);
        assert_eq!(admin.status, AdminStatus::Active);
        assert_eq!(admin.phone, "");
        assert!(!admin.permissions.manage_users);
    }

    #[test]
    fn role_parses_loosely() {
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("moderator".parse::<Role>().unwrap(), Role::Moderator);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn moderators_only_manage_content() {
        let perms = Permissions::for_role(Role::Moderator);
        assert_eq!(perms.granted(), vec!["content"]);
    }
}
