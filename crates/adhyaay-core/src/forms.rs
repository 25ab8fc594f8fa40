//! Client-side validation for the login, registration and booking forms.
//!
//! Each form validates into the request it submits, so an invalid form can
//! never reach the API client. Rules are checked per field in order and only
//! the first failing rule of a field is reported.

use std::sync::LazyLock;

use chrono::{NaiveDate, SecondsFormat};
use regex::Regex;
use thiserror::Error;

use crate::models::{AppointmentRequest, LoginRequest, RegisterRequest, UserProfile};

/// Minimum length of a display name at registration.
const MIN_NAME_LENGTH: usize = 2;

/// Minimum password length at registration.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Shown when any booking field is left empty.
pub const BOOKING_INCOMPLETE_MESSAGE: &str = "Please fill in all fields before submitting!";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", summarize(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Message for one field, if it failed.
    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }
}

/// Accumulates the first failing rule of each field.
#[derive(Default)]
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn check(&mut self, field: &'static str, rules: &[(bool, &'static str)]) {
        if let Some(&(_, message)) = rules.iter().find(|(ok, _)| !ok) {
            self.errors.push(FieldError { field, message });
        }
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut checker = Checker::default();
        checker.check("email", &[(!self.email.is_empty(), "Email is required")]);
        checker.check("password", &[(!self.password.is_empty(), "Password is required")]);
        checker.finish(|| LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut checker = Checker::default();
        checker.check(
            "name",
            &[
                (!self.name.is_empty(), "Name is required"),
                (
                    char_len(&self.name) >= MIN_NAME_LENGTH,
                    "Name must be at least 2 characters",
                ),
            ],
        );
        checker.check(
            "email",
            &[
                (!self.email.is_empty(), "Email is required"),
                (EMAIL_PATTERN.is_match(&self.email), "Invalid email address"),
            ],
        );
        checker.check(
            "password",
            &[
                (!self.password.is_empty(), "Password is required"),
                (
                    char_len(&self.password) >= MIN_PASSWORD_LENGTH,
                    "Password must be at least 6 characters",
                ),
            ],
        );
        checker.finish(|| RegisterRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

// ============================================================================
// Booking
// ============================================================================

/// The booking form. Name and email come from the signed-in profile and are
/// not edited by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub junior_name: String,
    pub junior_email: String,
    pub semester: String,
    pub description: String,
    /// Selected mentor id.
    pub mentor: String,
    /// Chosen day, `YYYY-MM-DD`.
    pub date: String,
}

impl BookingForm {
    /// Fill name and email from the current user's profile.
    pub fn prefill(&mut self, profile: &UserProfile) {
        self.junior_name = profile.display_name().to_string();
        self.junior_email = profile.display_email().to_string();
    }

    /// Clear every field, including the prefilled ones.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_complete(&self) -> bool {
        [
            &self.junior_name,
            &self.junior_email,
            &self.semester,
            &self.description,
            &self.mentor,
            &self.date,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }

    pub fn validate(&self) -> Result<AppointmentRequest, ValidationErrors> {
        let mut checker = Checker::default();
        checker.check("form", &[(self.is_complete(), BOOKING_INCOMPLETE_MESSAGE)]);

        let date = if self.date.is_empty() {
            None
        } else {
            let parsed = to_utc_midnight(&self.date);
            checker.check("date", &[(parsed.is_some(), "Invalid date")]);
            parsed
        };

        checker.finish(|| AppointmentRequest {
            junior_name: self.junior_name.clone(),
            junior_email: self.junior_email.clone(),
            semester: self.semester.clone(),
            description: self.description.clone(),
            mentor: self.mentor.clone(),
            date: date.unwrap_or_default(),
        })
    }
}

/// `YYYY-MM-DD` to the ISO-8601 timestamp of midnight UTC on that day.
pub fn to_utc_midnight(date: &str) -> Option<String> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let midnight = day.and_hms_opt(0, 0, 0)?.and_utc();
    Some(midnight.to_rfc3339_opts(SecondsFormat::Millis, true))
}
