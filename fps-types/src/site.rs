//! Site identity.
//!
//! A `Site` is the unit of First-Party Set membership: a scheme plus a
//! registrable domain, already reduced by the upstream parser. Within
//! this workspace it is an opaque comparable value; equality and
//! hashing are the only operations the engine needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A normalized site identity (e.g. `https://example.test`).
///
/// Websocket schemes collapse into their HTTP counterparts at
/// construction, so `wss://example.test` and `https://example.test`
/// are the same `Site`. Registrable-domain reduction is owned by the
/// upstream parser and assumed done before a `Site` is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Site(String);

impl Site {
    /// Creates a site from its serialized form, collapsing websocket
    /// schemes into the equivalent HTTP scheme.
    #[must_use]
    pub fn new(serialized: impl Into<String>) -> Self {
        let s = serialized.into();
        if let Some(rest) = s.strip_prefix("wss://") {
            Self(format!("https://{rest}"))
        } else if let Some(rest) = s.strip_prefix("ws://") {
            Self(format!("http://{rest}"))
        } else {
            Self(s)
        }
    }

    /// Returns the serialized form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Site {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Site {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Site {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
