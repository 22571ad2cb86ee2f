//! Client-side form validation.
//!
//! Forms are checked before any request is issued. A failed check blocks the
//! submission entirely and yields one message per offending field, so a UI can
//! render them inline next to the inputs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex should be valid")
});

/// Field-level validation messages, keyed by field name.
///
/// Only the first message recorded for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Trimmed text must have at least `min` characters.
    pub fn min_chars(&mut self, field: &'static str, value: &str, min: usize, message: &str) {
        self.check(value.trim().chars().count() >= min, field, message);
    }

    /// Number must be finite and `>= min`.
    pub fn at_least(&mut self, field: &'static str, value: f64, min: f64, message: &str) {
        self.check(value.is_finite() && value >= min, field, message);
    }

    /// Number must be finite and `<= max`.
    pub fn at_most(&mut self, field: &'static str, value: f64, max: f64, message: &str) {
        self.check(value.is_finite() && value <= max, field, message);
    }

    /// Number must lie in `[0, 100]`.
    pub fn percentage(&mut self, field: &'static str, value: f64) {
        self.at_least(field, value, 0.0, "Percentage must be >= 0");
        self.at_most(field, value, 100.0, "Percentage cannot exceed 100");
    }

    pub fn email(&mut self, field: &'static str, value: &str) {
        self.check(is_valid_email(value), field, "Invalid email");
    }

    /// Text must parse as a `YYYY-MM-DD` calendar date.
    pub fn iso_date(&mut self, field: &'static str, value: &str, message: &str) {
        self.check(is_iso_date(value), field, message);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Forms implement this to gate submission.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 100 && EMAIL_REGEX.is_match(value.trim())
}

pub fn is_iso_date(value: &str) -> bool {
    value.trim().parse::<jiff::civil::Date>().is_ok()
}
