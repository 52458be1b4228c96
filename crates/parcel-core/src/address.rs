//! Message destinations and reply targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// A destination or reply-to target: a name with an optional subject.
///
/// Addresses are plain values; cloning one never shares state with the
/// original.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// The target, e.g. a queue or exchange name.
    pub name: String,
    /// Optional routing refinement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Address {
    /// Creates an address with no subject.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subject: None,
        }
    }

    /// Builder: set the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = Some(subject.into());
    }

    /// Returns the subject, if any.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "{}/{}", self.name, subject),
            None => f.write_str(&self.name),
        }
    }
}

/// Parses `name` or `name/subject`.
///
/// The name ends at the first `/`, so a name that itself contains `/` does
/// not survive a trip through [`Display`](fmt::Display) and back: `a/b`
/// parses as name `a` with subject `b`. Build such addresses with
/// [`Address::new`].
impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, subject) = match s.split_once('/') {
            Some((name, subject)) => (name.trim(), Some(subject.trim())),
            None => (s.trim(), None),
        };

        if name.is_empty() {
            return Err(AddressError::EmptyName);
        }

        Ok(Self {
            name: name.to_string(),
            subject: subject.filter(|s| !s.is_empty()).map(str::to_string),
        })
    }
}
