//! Declarative validation of submitted HTML forms.
//!
//! A [`Form`] holds the raw `application/x-www-form-urlencoded` values of one submission and
//! an error map keyed by field name. Rule methods inspect a single field and append messages;
//! they never remove errors and never fail. Handlers call the rules they need and then check
//! [`Form::valid`].

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

lazy_static! {
    /// Pattern used to sanity check email addresses on signup.
    pub static ref EMAIL_RX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("email pattern compiles");
}

/// Validation messages collected per field, in the order the rules added them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(HashMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// First message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|msgs| msgs.first()).map(String::as_str)
    }

    pub fn all(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// Submitted form values plus the errors found while validating them.
#[derive(Debug, Clone, Default)]
pub struct Form {
    values: HashMap<String, Vec<String>>,
    pub errors: FormErrors,
}

impl Form {
    pub fn new(values: HashMap<String, Vec<String>>) -> Self {
        Self { values, errors: FormErrors::default() }
    }

    /// Parses an urlencoded body. Repeated keys keep every value in submission order.
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in url::form_urlencoded::parse(body) {
            values.entry(k.into_owned()).or_default().push(v.into_owned());
        }
        Self::new(values)
    }

    /// First submitted value for `field`, or `""` when absent.
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).and_then(|v| v.first()).map(String::as_str).unwrap_or("")
    }

    pub fn get_all(&self, field: &str) -> &[String] {
        self.values.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), vec![value.into()]);
    }

    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.errors.add(field, "This field cannot be blank");
            }
        }
    }

    /// Length is counted in characters, not bytes. Empty values are skipped.
    pub fn max_length(&mut self, field: &str, max: usize) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if value.chars().count() > max {
            self.errors
                .add(field, format!("This field is too long (maximum is {} characters)", max));
        }
    }

    pub fn min_length(&mut self, field: &str, min: usize) {
        let value = self.get(field);
        if value.is_empty() {
            return;
        }
        if value.chars().count() < min {
            self.errors
                .add(field, format!("This field is too short (minimum is {} characters)", min));
        }
    }

    pub fn permitted_values(&mut self, field: &str, options: &[&str]) {
        let value = self.get(field);
        if value.is_empty() || options.contains(&value) {
            return;
        }
        self.errors.add(field, "This field is invalid");
    }

    pub fn matches_pattern(&mut self, field: &str, pattern: &Regex) {
        let value = self.get(field);
        if value.is_empty() || pattern.is_match(value) {
            return;
        }
        self.errors.add(field, "This field is invalid");
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<S> FromRequest<S> for Form
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("unreadable form body: {}", e)))?;
        Ok(Form::from_urlencoded(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Form {
        let mut f = Form::default();
        for (k, v) in pairs {
            f.set(k, *v);
        }
        f
    }

    #[test]
    fn test_required_rejects_whitespace() {
        let mut f = form(&[("title", "   \t\n")]);
        f.required(&["title", "missing"]);
        assert_eq!(f.errors.get("title"), Some("This field cannot be blank"));
        assert_eq!(f.errors.get("missing"), Some("This field cannot be blank"));
        assert!(!f.valid());
    }

    #[test]
    fn test_max_length_counts_characters() {
        let mut f = form(&[("title", "ééééé")]);
        f.max_length("title", 5);
        assert!(f.valid());

        f.max_length("title", 4);
        assert_eq!(f.errors.all("title").len(), 1);
        assert_eq!(
            f.errors.get("title"),
            Some("This field is too long (maximum is 4 characters)")
        );
    }

    #[test]
    fn test_max_length_skips_empty() {
        for n in [0, 1, 100] {
            let mut f = form(&[("title", "")]);
            f.max_length("title", n);
            assert!(f.valid());
        }
    }

    #[test]
    fn test_min_length() {
        let mut f = form(&[("password", "short"), ("empty", "")]);
        f.min_length("password", 10);
        f.min_length("empty", 10);
        assert_eq!(
            f.errors.get("password"),
            Some("This field is too short (minimum is 10 characters)")
        );
        assert!(f.errors.get("empty").is_none());
    }

    #[test]
    fn test_permitted_values() {
        for ok in ["1", "7", "365"] {
            let mut f = form(&[("expires", ok)]);
            f.permitted_values("expires", &["1", "7", "365"]);
            assert!(f.valid(), "{} should be accepted", ok);
        }
        for bad in ["2", " 7", "365 ", "seven"] {
            let mut f = form(&[("expires", bad)]);
            f.permitted_values("expires", &["1", "7", "365"]);
            assert_eq!(f.errors.get("expires"), Some("This field is invalid"));
        }
        let mut f = form(&[("expires", "")]);
        f.permitted_values("expires", &["1", "7", "365"]);
        assert!(f.valid());
    }

    #[test]
    fn test_rules_accumulate_on_same_field() {
        let mut f = form(&[("email", "not-an-email-and-much-too-long")]);
        f.max_length("email", 10);
        f.matches_pattern("email", &EMAIL_RX);
        assert_eq!(f.errors.all("email").len(), 2);
        assert_eq!(f.errors.len(), 2);
    }

    #[test]
    fn test_matches_pattern() {
        let mut f = form(&[("email", "alice@example.com")]);
        f.matches_pattern("email", &EMAIL_RX);
        assert!(f.valid());

        let mut f = form(&[("email", "alice@")]);
        f.matches_pattern("email", &EMAIL_RX);
        assert_eq!(f.errors.get("email"), Some("This field is invalid"));
    }

    #[test]
    fn test_from_urlencoded_keeps_repeated_values() {
        let f = Form::from_urlencoded(b"title=O+snail&tag=a&tag=b&content=caf%C3%A9");
        assert_eq!(f.get("title"), "O snail");
        assert_eq!(f.get("content"), "café");
        assert_eq!(f.get_all("tag"), ["a".to_string(), "b".to_string()]);
        assert_eq!(f.get("absent"), "");
    }
}
