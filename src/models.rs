use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Date format used by the birthday service for `dob`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Birthday {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wish: Option<String>,
    #[serde(default, deserialize_with = "photo_count", skip_serializing)]
    pub photos: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<bool>,
    #[serde(rename = "createdBy_name", default, skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
    #[serde(rename = "createdBy_email", default, skip_serializing_if = "Option::is_none")]
    pub created_by_email: Option<String>,
}

impl Birthday {
    /// "Name (email)" of the account that added the record, when the server sends it
    pub fn added_by(&self) -> Option<String> {
        match (&self.created_by_name, &self.created_by_email) {
            (Some(name), Some(email)) => Some(format!("{} ({})", name, email)),
            (Some(name), None) => Some(name.clone()),
            (None, Some(email)) => Some(email.clone()),
            (None, None) => None,
        }
    }
}

/// The service stores photos as an array; the client only needs how many exist.
fn photo_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items.len(),
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0) as usize,
        _ => 0,
    })
}

/// Creation payload for a birthday record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBirthday {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub relationship: String,
    pub contact: String,
    pub dob: String,
    pub email: String,
}

impl NewBirthday {
    /// Build a payload, deriving `age` from `dob` as of `today`
    pub fn new(
        name: &str,
        gender: &str,
        relationship: &str,
        contact: &str,
        dob: NaiveDate,
        email: &str,
        today: NaiveDate,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            age: age_on(dob, today),
            gender: gender.to_string(),
            relationship: relationship.to_string(),
            contact: contact.trim().to_string(),
            dob: dob.format(DATE_FORMAT).to_string(),
            email: email.trim().to_string(),
        }
    }

    /// Full-field patch carrying the same values, used when editing an existing record
    pub fn into_patch(self) -> BirthdayPatch {
        BirthdayPatch {
            name: Some(self.name),
            age: Some(self.age),
            gender: Some(self.gender),
            relationship: Some(self.relationship),
            contact: Some(self.contact),
            dob: Some(self.dob),
            email: Some(self.email),
        }
    }
}

/// Partial update; absent fields are left untouched by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BirthdayPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl BirthdayPatch {
    pub fn is_empty(&self) -> bool {
        *self == BirthdayPatch::default()
    }
}

/// Full years between `dob` and `today`
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct Credentials {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Enter a valid email")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct Registration {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Enter a valid email")
    )]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Family,
    Friend,
    Colleague,
    Partner,
}

impl Relationship {
    pub const ALL: [Relationship; 4] = [
        Relationship::Family,
        Relationship::Friend,
        Relationship::Colleague,
        Relationship::Partner,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Relationship::Family => "family",
            Relationship::Friend => "friend",
            Relationship::Colleague => "colleague",
            Relationship::Partner => "partner",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(value.trim()))
    }
}
