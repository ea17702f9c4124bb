//! Field validation for the forms, run before anything is sent to the service

use std::borrow::Cow;

use chrono::NaiveDate;
use thiserror::Error;
use validator::{Validate, ValidateArgs};

use crate::models::{Birthday, Credentials, NewBirthday, Registration, DATE_FORMAT};

/// A validation failure attributed to one input field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// All failures found in one form, in field order
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: &str) {
        self.errors.push(ValidationError::new(field, message));
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Re-attribute a `validator` report to `fields`, in that order, one message each
    fn from_report(report: &validator::ValidationErrors, fields: &[&'static str]) -> Self {
        let by_field = report.field_errors();
        let mut errors = ValidationErrors::default();
        for &field in fields {
            let Some(found) = by_field.get(field) else {
                continue;
            };
            // an empty value reports as missing, not malformed
            let first = found
                .iter()
                .find(|error| error.code == "length")
                .or_else(|| found.first());
            if let Some(error) = first {
                errors.push(field, error.message.as_deref().unwrap_or("Invalid value"));
            }
        }
        errors
    }
}

const BIRTHDAY_FIELDS: [&str; 6] = ["name", "gender", "relationship", "contact", "dob", "email"];

/// Raw text of the birthday form, as typed by the user
#[derive(Debug, Clone, Default, Validate)]
#[validate(context = NaiveDate)]
pub struct BirthdayForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Gender is required"))]
    pub gender: String,
    #[validate(length(min = 1, message = "Relationship is required"))]
    pub relationship: String,
    #[validate(length(min = 1, message = "Contact is required"))]
    pub contact: String,
    #[validate(
        length(min = 1, message = "Date of birth is required"),
        custom(function = "validate_dob", use_context)
    )]
    pub dob: String,
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Enter valid email")
    )]
    pub email: String,
}

impl BirthdayForm {
    /// Prefill from an existing record, for editing
    pub fn from_birthday(birthday: &Birthday) -> Self {
        Self {
            name: birthday.name.clone(),
            gender: birthday.gender.clone(),
            relationship: birthday.relationship.clone(),
            contact: birthday.contact.clone(),
            dob: birthday.dob.clone(),
            email: birthday.email.clone(),
        }
    }

    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            gender: self.gender.trim().to_string(),
            relationship: self.relationship.trim().to_string(),
            contact: self.contact.trim().to_string(),
            dob: self.dob.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    /// Validate and turn the form into a creation payload with `age` derived as of `today`
    pub fn parse(&self, today: NaiveDate) -> Result<NewBirthday, ValidationErrors> {
        let form = self.trimmed();
        form.validate_with_args(&today)
            .map_err(|report| ValidationErrors::from_report(&report, &BIRTHDAY_FIELDS))?;

        let dob = NaiveDate::parse_from_str(&form.dob, DATE_FORMAT).map_err(|_| {
            let mut errors = ValidationErrors::default();
            errors.push("dob", DOB_FORMAT_MESSAGE);
            errors
        })?;
        Ok(NewBirthday::new(
            &form.name,
            &form.gender,
            &form.relationship,
            &form.contact,
            dob,
            &form.email,
            today,
        ))
    }
}

const DOB_FORMAT_MESSAGE: &str = "Enter date as YYYY-MM-DD";

fn validate_dob(value: &str, today: &NaiveDate) -> Result<(), validator::ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) if date > *today => Err(validator::ValidationError::new("dob_future")
            .with_message(Cow::Borrowed("Date of birth cannot be in the future"))),
        Ok(_) => Ok(()),
        Err(_) => Err(validator::ValidationError::new("dob_format")
            .with_message(Cow::Borrowed(DOB_FORMAT_MESSAGE))),
    }
}

pub fn validate_credentials(credentials: &Credentials) -> Result<(), ValidationErrors> {
    let credentials = Credentials {
        email: credentials.email.trim().to_string(),
        ..credentials.clone()
    };
    credentials
        .validate()
        .map_err(|report| ValidationErrors::from_report(&report, &["email", "password"]))
}

pub fn validate_registration(registration: &Registration) -> Result<(), ValidationErrors> {
    let registration = Registration {
        name: registration.name.trim().to_string(),
        email: registration.email.trim().to_string(),
        ..registration.clone()
    };
    registration
        .validate()
        .map_err(|report| ValidationErrors::from_report(&report, &["name", "email", "password"]))
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn valid_form() -> BirthdayForm {
        BirthdayForm {
            name: "Alice".to_string(),
            gender: "Female".to_string(),
            relationship: "friend".to_string(),
            contact: "5551234".to_string(),
            dob: "1990-06-15".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn test_valid_form_parses() {
        let payload = valid_form().parse(today()).unwrap();
        assert_eq!(payload.age, 33);
        assert_eq!(payload.relationship, "friend");
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = BirthdayForm::default().parse(today()).unwrap_err();
        let fields: Vec<_> = errors.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["name", "gender", "relationship", "contact", "dob", "email"]
        );
        assert_eq!(errors.for_field("email"), Some("Email is required"));
    }

    #[test]
    fn test_bad_date_and_email() {
        let form = BirthdayForm {
            dob: "15/06/1990".to_string(),
            email: "alice-at-example".to_string(),
            ..valid_form()
        };
        let errors = form.parse(today()).unwrap_err();
        assert_eq!(errors.for_field("dob"), Some("Enter date as YYYY-MM-DD"));
        assert_eq!(errors.for_field("email"), Some("Enter valid email"));

        let future = BirthdayForm {
            dob: "2030-01-01".to_string(),
            ..valid_form()
        };
        assert!(future.parse(today()).unwrap_err().for_field("dob").is_some());
    }

    #[test]
    fn test_registration_rules() {
        let registration = Registration {
            name: "Al".to_string(),
            email: "al@example.com".to_string(),
            password: "12345".to_string(),
        };
        let errors = validate_registration(&registration).unwrap_err();
        assert_eq!(errors.for_field("name"), Some("Name must be at least 3 characters"));
        assert_eq!(
            errors.for_field("password"),
            Some("Password must be at least 6 characters")
        );
        assert!(errors.for_field("email").is_none());
    }

    #[test]
    fn test_credentials_rules() {
        let ok = Credentials {
            email: "me@example.com".to_string(),
            password: "secret".to_string(),
        };
        assert!(validate_credentials(&ok).is_ok());

        let missing = Credentials {
            email: String::new(),
            password: String::new(),
        };
        assert_eq!(validate_credentials(&missing).unwrap_err().errors.len(), 2);
    }

    #[test]
    fn test_email_rules_come_from_validator() {
        let with = |email: &str| Credentials {
            email: email.to_string(),
            password: "secret".to_string(),
        };
        assert!(validate_credentials(&with("a.b@mail.example.org")).is_ok());
        assert!(validate_credentials(&with("  me@example.com ")).is_ok());
        for bad in ["@example.com", "a b@example.com", "no-at-sign"] {
            let errors = validate_credentials(&with(bad)).unwrap_err();
            assert_eq!(errors.for_field("email"), Some("Enter a valid email"), "{}", bad);
        }
    }

    #[test]
    fn test_blank_fields_report_required_not_malformed() {
        let form = BirthdayForm {
            name: "   ".to_string(),
            email: " ".to_string(),
            ..valid_form()
        };
        let errors = form.parse(today()).unwrap_err();
        assert_eq!(errors.errors.len(), 2);
        assert_eq!(errors.for_field("name"), Some("Name is required"));
        assert_eq!(errors.for_field("email"), Some("Email is required"));
    }

    #[test]
    fn test_future_date_message() {
        let form = BirthdayForm {
            dob: "2024-05-02".to_string(),
            ..valid_form()
        };
        let errors = form.parse(today()).unwrap_err();
        assert_eq!(
            errors.for_field("dob"),
            Some("Date of birth cannot be in the future")
        );
        let born_today = BirthdayForm {
            dob: "2024-05-01".to_string(),
            ..valid_form()
        };
        assert_eq!(born_today.parse(today()).unwrap().age, 0);
    }
}
