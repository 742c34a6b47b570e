//! Identifiers and e-mail addresses.

use std::fmt;

use rand::{distributions::Alphanumeric, Rng};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{OrderlyError, Result};

/// Length of every generated identifier.
pub const ID_LEN: usize = 32;

/// Upper bound for an e-mail address.
const MAX_EMAIL_LEN: usize = 254;

/// Opaque 32-character alphanumeric identifier.
///
/// The empty identifier is the "unset" sentinel used by partial requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// The unset sentinel.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the identifier shape, naming `field` in the error.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` when the length is not 32 or a
    /// character falls outside `[a-zA-Z0-9]`.
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.0.len() != ID_LEN {
            return Err(OrderlyError::invalid(field).with_reason("invalid id length"));
        }
        if let Some(c) = self.0.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(OrderlyError::invalid(field)
                .with_reason(format!("disallowed character ('{c}') in id")));
        }
        Ok(())
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User e-mail address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the address syntax, naming `field` in the error.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` when the address is empty,
    /// too long, or not of the form `local@domain.tld`.
    pub fn validate(&self, field: &str) -> Result<()> {
        let address = self.0.as_str();
        if address.is_empty() || address.len() > MAX_EMAIL_LEN {
            return Err(OrderlyError::invalid(field).with_reason("invalid email length"));
        }
        if address
            .chars()
            .any(|c| c.is_whitespace() || c == '<' || c == '>')
        {
            return Err(OrderlyError::invalid(field).with_reason("invalid email"));
        }
        let Some((local, domain)) = address.split_once('@') else {
            return Err(OrderlyError::invalid(field).with_reason("invalid email"));
        };
        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.');
        if local.is_empty() || !domain_ok {
            return Err(OrderlyError::invalid(field).with_reason("invalid email"));
        }
        Ok(())
    }
}

impl From<&str> for Email {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Email {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
