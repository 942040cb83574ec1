//! Campaign recipient resolution.
//!
//! A campaign is addressed either to a group keyword (`all`, `students`,
//! `staff`), resolved against the site's directories, or to a
//! comma-separated list of addresses. Either way the result is trimmed,
//! lower-cased and deduplicated, keeping the first occurrence's position.

use crate::client::ApiClient;
use crate::error::Result;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

pub const STUDENTS_PATH: &str = "/api/student";
pub const STAFF_PATH: &str = "/api/staff";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientGroup {
    All,
    Students,
    Staff,
    Custom(Vec<String>),
}

impl RecipientGroup {
    /// Group keywords are matched case-insensitively; anything else is an
    /// address list.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "all" => RecipientGroup::All,
            "students" | "student" => RecipientGroup::Students,
            "staff" => RecipientGroup::Staff,
            _ => RecipientGroup::Custom(input.split(',').map(str::to_string).collect()),
        }
    }

    /// The `recipientType` stored on the campaign.
    pub fn recipient_type(&self) -> &'static str {
        match self {
            RecipientGroup::All => "all",
            RecipientGroup::Students => "students",
            RecipientGroup::Staff => "staff",
            RecipientGroup::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for RecipientGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientGroup::Custom(list) => f.write_str(&list.join(",")),
            group => f.write_str(group.recipient_type()),
        }
    }
}

/// Where group members' addresses come from.
pub trait Directory {
    fn student_emails(&self) -> Result<Vec<String>>;
    fn staff_emails(&self) -> Result<Vec<String>>;
}

/// The site's `/api/student` and `/api/staff` listings.
pub struct RemoteDirectory {
    client: ApiClient,
}

impl RemoteDirectory {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn emails(&self, path: &str, keys: &[&str]) -> Result<Vec<String>> {
        let envelope = self.client.get(path)?;
        let people: Vec<Value> = envelope.list(keys)?;
        Ok(people
            .iter()
            .filter_map(|p| match p {
                Value::String(email) => Some(email.clone()),
                other => other.get("email").and_then(Value::as_str).map(String::from),
            })
            .collect())
    }
}

impl Directory for RemoteDirectory {
    fn student_emails(&self) -> Result<Vec<String>> {
        self.emails(STUDENTS_PATH, &["students", "student", "data"])
    }

    fn staff_emails(&self) -> Result<Vec<String>> {
        self.emails(STAFF_PATH, &["staff", "staffs", "data"])
    }
}

pub fn resolve(group: &RecipientGroup, directory: &impl Directory) -> Result<Vec<String>> {
    let raw = match group {
        RecipientGroup::All => {
            let mut all = directory.student_emails()?;
            all.extend(directory.staff_emails()?);
            all
        }
        RecipientGroup::Students => directory.student_emails()?,
        RecipientGroup::Staff => directory.staff_emails()?,
        RecipientGroup::Custom(list) => list.clone(),
    };
    Ok(dedupe(raw))
}

pub fn dedupe<I, S>(addresses: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    addresses
        .into_iter()
        .map(|a| a.as_ref().trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .filter(|a| seen.insert(a.clone()))
        .collect()
}
