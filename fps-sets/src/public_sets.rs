//! The canonical public set list and the one-shot local override merge.

use crate::config::FirstPartySetsContextConfig;
use crate::{Error, Result};
use fps_types::{Aliases, FlattenedSets, LocalSetDeclaration, MemberOverride, SetEntry, Site};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// The process-wide site→entry map derived from the published set
/// list, plus its alias table.
///
/// Constructed once from the published list, mutated at most once by
/// [`PublicSets::apply_manually_specified_set`], and effectively
/// immutable afterwards. Invariant: every alias value is itself a key
/// in `entries` (the list parser guarantees this; the merge preserves
/// it for entries it creates).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSets {
    entries: FlattenedSets,
    aliases: Aliases,
    #[serde(default)]
    manual_set_applied: bool,
}

impl PublicSets {
    /// Creates a public set list from already-parsed parts.
    #[must_use]
    pub fn new(entries: FlattenedSets, aliases: Aliases) -> Self {
        Self {
            entries,
            aliases,
            manual_set_applied: false,
        }
    }

    /// The site→entry map.
    #[must_use]
    pub fn entries(&self) -> &FlattenedSets {
        &self.entries
    }

    /// The alias→canonical table.
    #[must_use]
    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    /// Looks up the membership entry for `site`.
    ///
    /// A customization in `config` wins outright, including a
    /// tombstone (which answers "no entry"); aliases are never
    /// consulted once a customization resolved the query. Otherwise
    /// the site is looked up directly, then through one alias hop.
    #[must_use]
    pub fn find_entry(
        &self,
        site: &Site,
        config: Option<&FirstPartySetsContextConfig>,
    ) -> Option<SetEntry> {
        if let Some(config) = config {
            if let Some(overridden) = config.find_override(site) {
                return match overridden {
                    MemberOverride::Member(entry) => Some(entry.clone()),
                    MemberOverride::Removed => None,
                };
            }
        }
        if let Some(entry) = self.entries.get(site) {
            return Some(entry.clone());
        }
        self.aliases
            .get(site)
            .and_then(|canonical| self.entries.get(canonical))
            .cloned()
    }

    /// Batch form of [`PublicSets::find_entry`]; sites with no entry
    /// are omitted from the result.
    #[must_use]
    pub fn find_entries<'a>(
        &self,
        sites: impl IntoIterator<Item = &'a Site>,
        config: Option<&FirstPartySetsContextConfig>,
    ) -> FlattenedSets {
        sites
            .into_iter()
            .filter_map(|site| {
                self.find_entry(site, config)
                    .map(|entry| (site.clone(), entry))
            })
            .collect()
    }

    /// Merges a locally declared group into the public list.
    ///
    /// Runs at most once per instance; a second call is rejected with
    /// [`Error::SetAlreadyApplied`] before any mutation. Collision
    /// rules are evaluated against the pre-merge map:
    ///
    /// - local primary == existing primary: the existing group is
    ///   discarded wholesale
    /// - local primary == existing non-primary member of G: G is
    ///   discarded, the member is re-labeled as the local primary, and
    ///   alias entries targeting it are dropped
    /// - local member == existing primary: that group is discarded and
    ///   its former primary is reparented under the local primary
    /// - local member == existing non-primary member of G: the site is
    ///   stolen into the local group; if G's primary is left with no
    ///   members, the primary entry is deleted too
    ///
    /// The local group's sites and aliases are then inserted, local
    /// aliases overwriting prior entries for the same alias key.
    pub fn apply_manually_specified_set(&mut self, decl: &LocalSetDeclaration) -> Result<()> {
        if self.manual_set_applied {
            return Err(Error::SetAlreadyApplied);
        }
        self.manual_set_applied = true;

        let Some(local_set) = &decl.set else {
            return Ok(());
        };
        let local_primary = local_set.primary();

        // All rules read the pre-merge map.
        let pre_merge = self.entries.clone();

        // Groups discarded wholesale: the group owned by the local
        // primary (either role), and any group whose primary is now a
        // plain member of the local group.
        let mut doomed_owners: HashSet<Site> = HashSet::new();
        if let Some(existing) = pre_merge.get(local_primary) {
            if existing.is_primary() {
                debug!(primary = %local_primary, "local set replaces existing group");
                doomed_owners.insert(local_primary.clone());
            } else {
                debug!(
                    primary = %local_primary,
                    previous_owner = %existing.primary,
                    "local primary was a member elsewhere; discarding that group"
                );
                doomed_owners.insert(existing.primary.clone());
                self.aliases.retain(|_, canonical| *canonical != *local_primary);
            }
        }
        for (member, _) in local_set.members() {
            if pre_merge.get(member).is_some_and(SetEntry::is_primary) {
                debug!(member = %member, "local member was a primary; reparenting its group");
                doomed_owners.insert(member.clone());
            }
        }
        self.entries
            .retain(|_, entry| !doomed_owners.contains(&entry.primary));

        // Member/member steals, pruning owners left without members.
        for (member, _) in local_set.members() {
            let Some(existing) = pre_merge.get(member) else {
                continue;
            };
            if existing.is_primary() || doomed_owners.contains(&existing.primary) {
                continue;
            }
            let owner = existing.primary.clone();
            self.entries.remove(member);
            let owner_has_members = self
                .entries
                .iter()
                .any(|(site, entry)| entry.primary == owner && *site != owner);
            if !owner_has_members {
                debug!(owner = %owner, "stolen member left a singleton primary; pruning");
                self.entries.remove(&owner);
            }
        }

        for (site, entry) in local_set.flatten() {
            self.entries.insert(site, entry);
        }
        for (alias, canonical) in &decl.aliases {
            self.aliases.insert(alias.clone(), canonical.clone());
        }
        Ok(())
    }
}
