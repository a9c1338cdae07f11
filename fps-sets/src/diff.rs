//! Snapshot diffing for storage clearing.
//!
//! Compares the persisted (sets, policy) snapshot from the previous
//! run against the current one and reports every site whose effective
//! owner changed. The result drives data clearing downstream, so it is
//! deliberately conservative: owner/member role rotation within the
//! same pair reports both sites, because each site's recorded owner
//! literally differs. Over-clearing is safe; under-clearing is not.

use crate::config::FirstPartySetsContextConfig;
use crate::public_sets::PublicSets;
use fps_types::{FlattenedSets, MemberOverride, PolicyCustomization, Site};
use std::collections::HashSet;
use tracing::debug;

/// The effective owner of `site` in the current state: policy override
/// first, then the public lookup (with its alias hop), else none.
fn effective_owner(
    site: &Site,
    current_sets: &PublicSets,
    current_config: &FirstPartySetsContextConfig,
) -> Option<Site> {
    current_sets
        .find_entry(site, Some(current_config))
        .map(|entry| entry.primary)
}

/// Computes the sites whose effective owner changed between two
/// (sets, policy) snapshots.
///
/// If either snapshot is entirely empty the result is empty: first
/// runs and total disables must not trigger clearing.
#[must_use]
pub fn compute_sets_diff(
    old_sets: &FlattenedSets,
    old_policy: &PolicyCustomization,
    current_sets: &PublicSets,
    current_config: &FirstPartySetsContextConfig,
) -> HashSet<Site> {
    if old_sets.is_empty() && old_policy.is_empty() {
        return HashSet::new();
    }
    if current_sets.entries().is_empty() && current_config.customizations().is_empty() {
        return HashSet::new();
    }

    let mut changed = HashSet::new();

    // Sites whose previous membership came from the public list.
    for (site, old_entry) in old_sets {
        if old_policy.contains_key(site) {
            continue;
        }
        let current_owner = effective_owner(site, current_sets, current_config);
        if current_owner.as_ref() != Some(&old_entry.primary) {
            changed.insert(site.clone());
        }
    }

    // Sites whose previous membership was a policy override. This also
    // catches overrides that were lifted while the public assignment
    // moved underneath them.
    for (site, old_override) in old_policy {
        let MemberOverride::Member(old_entry) = old_override else {
            continue;
        };
        let current_owner = effective_owner(site, current_sets, current_config);
        if current_owner.as_ref() != Some(&old_entry.primary) {
            changed.insert(site.clone());
        }
    }

    debug!(count = changed.len(), "computed sets diff");
    changed
}
