//! Flat required-field checks run before a form is submitted.
//!
//! Nothing here evaluates business rules; the backend re-validates every
//! payload and its answer wins.

use super::ApiError;

/// Collects failed checks in the order they were evaluated.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Validator {
    messages: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails when the value is missing or only whitespace.
    pub fn required(&mut self, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.messages.push(message.to_string());
        }
        self
    }

    pub fn required_opt(&mut self, value: Option<&str>, message: &str) -> &mut Self {
        self.required(value.unwrap_or_default(), message)
    }

    /// Ids coming from selects use 0 for "nothing selected".
    pub fn selected(&mut self, id: i64, message: &str) -> &mut Self {
        if id <= 0 {
            self.messages.push(message.to_string());
        }
        self
    }

    pub fn positive(&mut self, value: f64, message: &str) -> &mut Self {
        if value.is_nan() || value <= 0.0 {
            self.messages.push(message.to_string());
        }
        self
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.messages.push(message.into());
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn finish(&self) -> Result<(), ApiError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation {
                messages: self.messages.clone(),
            })
        }
    }
}
