use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Account roles recognised by the platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Student,
    Employer,
    Admin,
}

impl Role {
    /// Case-insensitive parse. Whitespace around the value is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "employer" => Some(Role::Employer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }

    /// Route a freshly logged-in account lands on. Admins share the public
    /// listing entry point and navigate to their own area from there.
    pub fn landing_route(&self) -> &'static str {
        match self {
            Role::Student => "/profile/student",
            Role::Employer => "/profile/company",
            Role::Admin => "/internships",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review state shared by user accounts, internship postings, and
/// applications. `Approved` and `Rejected` are terminal on the client.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ModerationStatus::Pending)
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            other => Err(format!("unknown moderation status: {other}")),
        }
    }
}

impl TryFrom<String> for ModerationStatus {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<ModerationStatus> for String {
    fn from(status: ModerationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account record as cached on the client. The backend owns the canonical
/// copy; only `role` is interpreted locally (by the access guard).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: Option<ModerationStatus>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Internship posting. Display fields are optional because the backend is
/// loose about which of them are present on any given record.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Internship {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub work_mode: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "stringy")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "stringy")]
    pub salary: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub positions_available: Option<i64>,
    #[serde(default)]
    pub status: Option<ModerationStatus>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub employer_user_id: Option<i64>,
}

/// A student's application to one internship.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Application {
    // Employer listings key the row as `application_id`.
    #[serde(default, alias = "application_id")]
    pub id: i64,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub internship_id: Option<i64>,
    #[serde(default)]
    pub status: Option<ModerationStatus>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub applied_at: Option<String>,
}

/// Accepts numbers or strings for fields the backend serialises either way
/// (durations and salaries in particular).
fn stringy<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Payloads arrive either bare or wrapped as `{ "data": ... }`.
pub(crate) fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a list that may be bare (`[...]`) or keyed
/// (`{ "internships": [...] }`), in either case possibly under `data`.
/// Anything else decodes to an empty list, matching how the screens treat
/// nonconforming payloads.
pub(crate) fn decode_list<T>(value: Value, key: &str) -> Result<Vec<T>, serde_json::Error>
where
    T: serde::de::DeserializeOwned,
{
    let value = unwrap_data(value);
    let list = match value {
        Value::Object(mut map) => match map.remove(key) {
            Some(inner @ Value::Array(_)) => inner,
            _ => Value::Array(Vec::new()),
        },
        inner @ Value::Array(_) => inner,
        _ => Value::Array(Vec::new()),
    };
    serde_json::from_value(list)
}

/// Decode a single record, tolerating an optional wrapping key on top of the
/// usual `data` envelope (e.g. `{ "data": { "profile": {...} } }`).
pub(crate) fn decode_item<T>(value: Value, key: Option<&str>) -> Result<T, serde_json::Error>
where
    T: serde::de::DeserializeOwned,
{
    let mut value = unwrap_data(value);
    if let Some(key) = key {
        if let Value::Object(map) = &mut value {
            if let Some(inner) = map.remove(key) {
                if !inner.is_null() {
                    value = inner;
                }
            }
        }
    }
    serde_json::from_value(value)
}
