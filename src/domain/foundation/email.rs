//! Email address value object and recipient list parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A syntactically plausible email address, trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        Self::parse_field("email", raw)
    }

    /// Parses an address, reporting failures against `field`.
    pub fn parse_field(field: &str, raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field(field));
        }
        let (local, domain) = trimmed
            .split_once('@')
            .ok_or_else(|| ValidationError::invalid_format(field, "missing @ symbol"))?;
        if local.is_empty() || domain.contains('@') {
            return Err(ValidationError::invalid_format(field, "malformed address"));
        }
        let dot = domain
            .find('.')
            .ok_or_else(|| ValidationError::invalid_format(field, "domain has no dot"))?;
        if dot == 0 || domain.ends_with('.') || trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format(field, "malformed domain"));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> String {
        email.0
    }
}

/// Splits a recipient list on `,` or `;`, trimming entries and dropping blanks.
///
/// Entries are kept as typed; deliverability is the transport's concern.
pub fn parse_recipient_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
