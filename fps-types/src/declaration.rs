//! Declared set groups: enterprise policy lists and local overrides.

use crate::entry::{Aliases, FlattenedSets, SetEntry, SiteType};
use crate::site::Site;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One group as declared by enterprise policy or a local override:
/// a primary plus an ordered list of non-primary members.
///
/// Internally disjoint: no site appears twice, and the primary never
/// reappears in `members`. The constructor enforces both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSet {
    primary: Site,
    members: Vec<(Site, SiteType)>,
}

impl SingleSet {
    /// Creates a declared group, validating internal disjointness.
    ///
    /// A `SiteType::Primary` in `members` is rejected the same way a
    /// repeated primary site is: a group has exactly one primary.
    pub fn new(primary: Site, members: Vec<(Site, SiteType)>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (site, site_type) in &members {
            if *site == primary || *site_type == SiteType::Primary {
                return Err(Error::PrimaryListedAsMember(site.clone()));
            }
            if !seen.insert(site.clone()) {
                return Err(Error::DuplicateMember(site.clone()));
            }
        }
        Ok(Self { primary, members })
    }

    /// The group's primary site.
    #[must_use]
    pub fn primary(&self) -> &Site {
        &self.primary
    }

    /// The group's non-primary members, in declaration order.
    #[must_use]
    pub fn members(&self) -> &[(Site, SiteType)] {
        &self.members
    }

    /// Flattens this group into per-site entries.
    ///
    /// Associated members receive `site_index` ordinals in declaration
    /// order; the primary and Service members carry none.
    #[must_use]
    pub fn flatten(&self) -> FlattenedSets {
        let mut flat = FlattenedSets::new();
        flat.insert(self.primary.clone(), SetEntry::primary(self.primary.clone()));
        let mut next_index = 0u32;
        for (site, site_type) in &self.members {
            let site_index = match site_type {
                SiteType::Associated => {
                    let index = next_index;
                    next_index += 1;
                    Some(index)
                }
                SiteType::Primary | SiteType::Service => None,
            };
            flat.insert(
                site.clone(),
                SetEntry::new(self.primary.clone(), *site_type, site_index),
            );
        }
        flat
    }

    /// Iterates over every site in the group, primary first.
    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        std::iter::once(&self.primary).chain(self.members.iter().map(|(site, _)| site))
    }
}

/// Already-validated enterprise policy set lists for one context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPolicySetLists {
    /// Groups that replace any overlapping public groups outright.
    pub replacements: Vec<SingleSet>,
    /// Groups that absorb overlapping public groups into themselves.
    pub additions: Vec<SingleSet>,
}

impl ParsedPolicySetLists {
    /// Returns true if the policy declares no sets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.additions.is_empty()
    }
}

/// A locally declared override: at most one group, plus its aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSetDeclaration {
    /// The declared group, if any.
    pub set: Option<SingleSet>,
    /// Aliases for sites in the declared group.
    pub aliases: Aliases,
}

impl LocalSetDeclaration {
    /// Creates a declaration.
    #[must_use]
    pub fn new(set: Option<SingleSet>, aliases: Aliases) -> Self {
        Self { set, aliases }
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_none() && self.aliases.is_empty()
    }
}
