//! Per-site membership overrides.
//!
//! An override map answers "what does enterprise policy say about this
//! site?" with three possible states, kept unconfusable at the type
//! level:
//! - key present, [`MemberOverride::Member`] — membership replaced
//! - key present, [`MemberOverride::Removed`] — explicitly no group
//!   (a tombstone)
//! - key absent — no override, fall through to the public list

use crate::entry::SetEntry;
use crate::site::Site;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single site's policy-derived override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberOverride {
    /// The site's membership is replaced by this entry.
    Member(SetEntry),
    /// The site is explicitly removed from any group.
    Removed,
}

impl MemberOverride {
    /// Returns the overriding entry, or `None` for a tombstone.
    #[must_use]
    pub fn entry(&self) -> Option<&SetEntry> {
        match self {
            Self::Member(entry) => Some(entry),
            Self::Removed => None,
        }
    }

    /// Returns true if this override is a tombstone.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        matches!(self, Self::Removed)
    }
}

/// Mapping from site to its policy override for one browsing context.
pub type PolicyCustomization = HashMap<Site, MemberOverride>;
