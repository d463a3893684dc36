//! Field validation for every form in the client.
//!
//! Each form type exposes a pure `validate()` returning a full
//! [`ValidationErrors`] map: every field is present, and an empty message
//! means the field is fine. [`FormState`] holds the values together with the
//! errors currently on display and applies the form's revalidation trigger.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("digits pattern compiles"));

/// Field name to message, in the form's field order. Empty message means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<(&'static str, String)>);

impl ValidationErrors {
    /// A map with every field present and no messages.
    pub fn new(fields: &[&'static str]) -> Self {
        Self(fields.iter().map(|f| (*f, String::new())).collect())
    }

    pub fn set(&mut self, field: &'static str, message: impl Into<String>) {
        let message = message.into();
        match self.0.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => *slot = message,
            None => self.0.push((field, message)),
        }
    }

    pub fn get(&self, field: &str) -> &str {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
            .unwrap_or("")
    }

    pub fn has_error(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|(_, m)| m.is_empty())
    }

    /// First non-empty message, in field order.
    pub fn first(&self) -> Option<(&'static str, &str)> {
        self.iter().find(|(_, m)| !m.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(field, m)| format!("{}: {}", field, m))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn required(value: &str, message: &str) -> String {
    if is_blank(value) {
        message.to_string()
    } else {
        String::new()
    }
}

/// Message for an email field, empty when the value is acceptable.
pub fn email_error(value: &str) -> String {
    if is_blank(value) {
        "Email is required.".to_string()
    } else if !EMAIL_RE.is_match(value) {
        "Invalid email format.".to_string()
    } else {
        String::new()
    }
}

/// Message for a phone field, empty when the value is acceptable.
pub fn phone_error(value: &str) -> String {
    if is_blank(value) {
        "Phone number is required.".to_string()
    } else if !DIGITS_RE.is_match(value) {
        "Phone number must contain only digits.".to_string()
    } else {
        String::new()
    }
}

/// When the errors on display are recomputed while the user edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revalidate {
    /// Whole form on every edit.
    OnChange,
    /// Only the edited field on every edit.
    OnFieldChange,
    /// Whole form when a field loses focus.
    OnBlur,
}

pub trait Form {
    const FIELDS: &'static [&'static str];
    const REVALIDATE: Revalidate;

    fn validate(&self) -> ValidationErrors;

    /// True when no required field is blank.
    fn is_complete(&self) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

impl Form for RegistrationForm {
    const FIELDS: &'static [&'static str] = &["username", "phone", "email", "password"];
    const REVALIDATE: Revalidate = Revalidate::OnBlur;

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new(Self::FIELDS);
        errors.set("username", required(&self.username, "Username is required."));
        errors.set("phone", phone_error(&self.phone));
        errors.set("email", email_error(&self.email));
        errors.set("password", required(&self.password, "Password is required."));
        errors
    }

    fn is_complete(&self) -> bool {
        [&self.username, &self.phone, &self.email, &self.password]
            .iter()
            .all(|v| !is_blank(v))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl Form for LoginForm {
    const FIELDS: &'static [&'static str] = &["username", "password"];
    const REVALIDATE: Revalidate = Revalidate::OnFieldChange;

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new(Self::FIELDS);
        errors.set("username", required(&self.username, "Username is required."));
        errors.set("password", required(&self.password, "Password is required."));
        errors
    }

    fn is_complete(&self) -> bool {
        !is_blank(&self.username) && !is_blank(&self.password)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountForm {
    pub username: String,
    pub email: String,
}

impl Form for AccountForm {
    const FIELDS: &'static [&'static str] = &["username", "email"];
    const REVALIDATE: Revalidate = Revalidate::OnChange;

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new(Self::FIELDS);
        errors.set("username", required(&self.username, "Username is required."));
        errors.set("email", email_error(&self.email));
        errors
    }

    fn is_complete(&self) -> bool {
        !is_blank(&self.username) && !is_blank(&self.email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Form for ContactForm {
    const FIELDS: &'static [&'static str] = &["name", "email", "message"];
    const REVALIDATE: Revalidate = Revalidate::OnChange;

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new(Self::FIELDS);
        errors.set("name", required(&self.name, "Name is required."));
        errors.set("email", email_error(&self.email));
        errors.set("message", required(&self.message, "Message is required."));
        errors
    }

    fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.message]
            .iter()
            .all(|v| !is_blank(v))
    }
}

/// Form values plus the errors currently shown next to each field.
#[derive(Debug, Clone)]
pub struct FormState<F: Form> {
    values: F,
    errors: ValidationErrors,
}

impl<F: Form + Default> Default for FormState<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<F: Form> FormState<F> {
    pub fn new(values: F) -> Self {
        Self {
            values,
            errors: ValidationErrors::new(F::FIELDS),
        }
    }

    pub fn values(&self) -> &F {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Apply an edit to `field` and revalidate per the form's trigger.
    pub fn edit(&mut self, field: &'static str, apply: impl FnOnce(&mut F)) {
        apply(&mut self.values);
        match F::REVALIDATE {
            Revalidate::OnChange => self.errors = self.values.validate(),
            Revalidate::OnFieldChange => {
                let fresh = self.values.validate();
                self.errors.set(field, fresh.get(field));
            }
            Revalidate::OnBlur => {}
        }
    }

    pub fn blur(&mut self) {
        if F::REVALIDATE == Revalidate::OnBlur {
            self.errors = self.values.validate();
        }
    }

    /// Final full validation before submit. Returns true when valid.
    pub fn validate_all(&mut self) -> bool {
        self.errors = self.values.validate();
        self.errors.is_valid()
    }

    pub fn submit_disabled(&self) -> bool {
        !self.values.is_complete() || !self.errors.is_valid()
    }

    pub fn replace(&mut self, values: F) {
        self.values = values;
        self.errors = ValidationErrors::new(F::FIELDS);
    }
}

impl<F: Form + Default> FormState<F> {
    pub fn reset(&mut self) {
        self.replace(F::default());
    }
}
