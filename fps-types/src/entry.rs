//! Set membership entries and the flattened site→entry map.

use crate::site::Site;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role of a site within its First-Party Set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteType {
    /// The owning site of the group. Exactly one per group.
    Primary,
    /// A non-primary member sharing the primary's privacy boundary.
    Associated,
    /// A non-primary member providing shared infrastructure.
    Service,
}

/// One site's membership record: which group it belongs to and how.
///
/// `site_index` is a stable ordinal assigned to Associated members in
/// declaration order within their group; Primary and Service entries
/// carry none. Two entries are equal iff all fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetEntry {
    /// The primary (owner) of this site's group.
    pub primary: Site,
    /// This site's role within the group.
    pub site_type: SiteType,
    /// Declaration-order ordinal, Associated members only.
    pub site_index: Option<u32>,
}

impl SetEntry {
    /// Creates an entry with an explicit index.
    #[must_use]
    pub fn new(primary: Site, site_type: SiteType, site_index: Option<u32>) -> Self {
        Self {
            primary,
            site_type,
            site_index,
        }
    }

    /// Creates the entry a primary holds for itself.
    #[must_use]
    pub fn primary(site: Site) -> Self {
        Self::new(site, SiteType::Primary, None)
    }

    /// Creates an associated-member entry without an index.
    #[must_use]
    pub fn associated(primary: Site) -> Self {
        Self::new(primary, SiteType::Associated, None)
    }

    /// Returns true if this entry marks its site as the group primary.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.site_type == SiteType::Primary
    }
}

/// Mapping from site to its unique membership entry.
///
/// Central invariant: a site is a member of at most one group at a
/// time, which the map structure enforces by key uniqueness.
pub type FlattenedSets = HashMap<Site, SetEntry>;

/// Mapping from alias site (e.g. a ccTLD variant) to its canonical
/// site. Applies to the public list only, never to policy overrides.
pub type Aliases = HashMap<Site, Site>;
