//! Enterprise policy customization engine.
//!
//! Turns a context's "replacements"/"additions" set lists into a
//! [`FirstPartySetsContextConfig`]: a per-site override map layered
//! over the public list. The computation precomputes three auxiliary
//! maps so the main pass over the public entries is order-independent:
//!
//! 1. normalize transitively colliding addition sets into one group
//!    (earliest-declared primary wins)
//! 2. flatten replacements and normalized additions
//! 3. `addition_intersected_owners` — public owners absorbed by an
//!    addition group
//! 4. `potential_singletons` — public owners that may lose all their
//!    members to replacements
//! 5. `replaced_existing_owners` — public primaries directly named by
//!    a replacement
//! 6. one pass over the public entries applying those maps
//! 7. prune owners confirmed as singletons
//! 8. layer the policy's own entries on top, which always win

use crate::config::FirstPartySetsContextConfig;
use crate::public_sets::PublicSets;
use fps_types::{
    FlattenedSets, MemberOverride, ParsedPolicySetLists, PolicyCustomization, SetEntry, SingleSet,
    Site, SiteType,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// An addition group after transitive-overlap normalization.
struct NormalizedAddition {
    primary: Site,
    members: Vec<(Site, SiteType)>,
    sites: HashSet<Site>,
}

impl NormalizedAddition {
    fn from_set(set: &SingleSet) -> Self {
        Self {
            primary: set.primary().clone(),
            members: set.members().to_vec(),
            sites: set.sites().cloned().collect(),
        }
    }

    fn contains_any(&self, set: &SingleSet) -> bool {
        set.sites().any(|site| self.sites.contains(site))
    }

    /// Absorbs every site of `primary`+`members` as plain Associated
    /// members, skipping sites already present.
    fn absorb(&mut self, primary: Site, members: Vec<(Site, SiteType)>) {
        for site in std::iter::once(primary).chain(members.into_iter().map(|(site, _)| site)) {
            if self.sites.insert(site.clone()) {
                self.members.push((site, SiteType::Associated));
            }
        }
    }
}

/// Merges addition sets that collide (directly or through a shared
/// site) into one group. The primary declared earliest wins; all sites
/// of the losing groups become Associated members of the survivor.
/// Replacements are never normalized.
fn normalize_additions(additions: &[SingleSet]) -> Vec<NormalizedAddition> {
    let mut groups: Vec<NormalizedAddition> = Vec::new();
    for set in additions {
        let overlapping: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, group)| group.contains_any(set))
            .map(|(index, _)| index)
            .collect();

        let Some(&target) = overlapping.first() else {
            groups.push(NormalizedAddition::from_set(set));
            continue;
        };
        debug!(
            survivor = %groups[target].primary,
            absorbed = %set.primary(),
            "merging colliding addition sets"
        );

        // A later set can bridge previously disjoint groups; fold the
        // later groups into the earliest one before absorbing the set
        // itself. Indices are removed back-to-front to stay valid.
        for &index in overlapping.iter().skip(1).rev() {
            let loser = groups.remove(index);
            groups[target].absorb(loser.primary, loser.members);
        }
        groups[target].absorb(set.primary().clone(), set.members().to_vec());
    }
    groups
}

/// Flattens one declared group into per-site entries without ordinal
/// indices; policy-derived entries never carry a `site_index`.
fn flatten_unindexed(
    primary: &Site,
    members: impl Iterator<Item = (Site, SiteType)>,
    out: &mut FlattenedSets,
) {
    out.insert(primary.clone(), SetEntry::primary(primary.clone()));
    for (site, site_type) in members {
        out.insert(site, SetEntry::new(primary.clone(), site_type, None));
    }
}

/// Computes the per-context override map for an enterprise policy.
///
/// The returned config answers, for every site the policy touches
/// directly or indirectly, "what group is this site in now?" — either
/// a replacement entry, or an explicit removal for sites orphaned by
/// the policy. Sites the policy leaves alone are absent and fall
/// through to the public list.
#[must_use]
pub fn compute_enterprise_customizations(
    public_sets: &PublicSets,
    policy: &ParsedPolicySetLists,
) -> FirstPartySetsContextConfig {
    let mut result = PolicyCustomization::new();

    let normalized_additions = normalize_additions(&policy.additions);

    let mut flat_replacements = FlattenedSets::new();
    for set in &policy.replacements {
        flatten_unindexed(
            set.primary(),
            set.members().iter().cloned(),
            &mut flat_replacements,
        );
    }
    let mut flat_additions = FlattenedSets::new();
    for group in &normalized_additions {
        flatten_unindexed(
            &group.primary,
            group.members.iter().cloned(),
            &mut flat_additions,
        );
    }

    // Public owners whose group is absorbed by an addition: old owner
    // to new owner. Iterated in declaration order so a site reachable
    // from two groups resolves deterministically (it cannot be, after
    // normalization, but the order costs nothing).
    let mut addition_intersected_owners: HashMap<Site, Site> = HashMap::new();
    for group in &normalized_additions {
        for site in std::iter::once(&group.primary).chain(group.members.iter().map(|(s, _)| s)) {
            if let Some(existing) = public_sets.entries().get(site) {
                addition_intersected_owners
                    .entry(existing.primary.clone())
                    .or_insert_with(|| group.primary.clone());
            }
        }
    }

    // Public owners that may end up with no members because a
    // replacement pulled them away. Confirmed or refuted in the main
    // pass below.
    let mut potential_singletons: HashMap<Site, HashSet<Site>> = HashMap::new();
    for (member, entry) in &flat_replacements {
        if *member == entry.primary {
            continue;
        }
        let Some(existing) = public_sets.entries().get(member) else {
            continue;
        };
        if existing.is_primary() {
            continue;
        }
        let existing_owner = &existing.primary;
        if addition_intersected_owners.contains_key(existing_owner)
            || flat_additions.contains_key(existing_owner)
            || flat_replacements.contains_key(existing_owner)
        {
            continue;
        }
        potential_singletons
            .entry(existing_owner.clone())
            .or_default()
            .insert(member.clone());
    }

    // Public primaries directly named by a replacement; their orphaned
    // members get tombstoned in the main pass.
    let replaced_existing_owners: HashSet<Site> = flat_replacements
        .keys()
        .filter(|site| {
            public_sets
                .entries()
                .get(*site)
                .is_some_and(SetEntry::is_primary)
        })
        .cloned()
        .collect();

    // Main pass: order-independent given the maps above.
    for (member, entry) in public_sets.entries() {
        let owner = &entry.primary;

        if let Some(new_owner) = addition_intersected_owners.get(owner) {
            if !flat_replacements.contains_key(member) {
                result.insert(
                    member.clone(),
                    MemberOverride::Member(SetEntry::associated(new_owner.clone())),
                );
            }
        }

        // Primaries are handled through the maps, never removed here.
        if member == owner {
            continue;
        }

        if let Some(pulled) = potential_singletons.get(owner) {
            if !pulled.contains(member) {
                // A member survives under this owner, so it is not
                // actually becoming a singleton.
                potential_singletons.remove(owner);
            }
        }

        if replaced_existing_owners.contains(owner)
            && !flat_replacements.contains_key(member)
            && !addition_intersected_owners.contains_key(owner)
        {
            result.insert(member.clone(), MemberOverride::Removed);
        }
    }

    // Owners still here really did lose every member.
    for owner in potential_singletons.into_keys() {
        debug!(owner = %owner, "public group reduced to a singleton; removing");
        result.insert(owner, MemberOverride::Removed);
    }

    // Policy entries are authoritative: they overwrite any tombstone
    // or reparenting derived above for the same site.
    for (site, entry) in flat_replacements.into_iter().chain(flat_additions) {
        result.insert(site, MemberOverride::Member(entry));
    }

    FirstPartySetsContextConfig::new(result)
}
