//! Per-context First-Party Sets configuration.

use fps_types::{MemberOverride, PolicyCustomization, Site};
use serde::{Deserialize, Serialize};

/// The per-browsing-context overlay on top of the public set list.
///
/// Computed once per context from that context's enterprise policy and
/// immutable thereafter (policy is not hot-reloadable).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstPartySetsContextConfig {
    enabled: bool,
    customizations: PolicyCustomization,
}

impl FirstPartySetsContextConfig {
    /// Creates an enabled config with the given overrides.
    #[must_use]
    pub fn new(customizations: PolicyCustomization) -> Self {
        Self {
            enabled: true,
            customizations,
        }
    }

    /// Creates the config for a context where the feature is off.
    ///
    /// Lookups through a disabled config fall straight through to the
    /// public list.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            customizations: PolicyCustomization::new(),
        }
    }

    /// Returns true if First-Party Sets are enabled for this context.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The raw override map.
    #[must_use]
    pub fn customizations(&self) -> &PolicyCustomization {
        &self.customizations
    }

    /// Looks up this context's override for `site`, if any.
    ///
    /// A `Some(MemberOverride::Removed)` answer is meaningful: the site
    /// is explicitly in no group, which is different from an absent key
    /// (no override, fall through to the public list).
    #[must_use]
    pub fn find_override(&self, site: &Site) -> Option<&MemberOverride> {
        if !self.enabled {
            return None;
        }
        self.customizations.get(site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fps_types::SetEntry;

    #[test]
    fn disabled_config_hides_overrides() {
        let site = Site::new("https://member.test");
        let mut customizations = PolicyCustomization::new();
        customizations.insert(site.clone(), MemberOverride::Removed);

        let enabled = FirstPartySetsContextConfig::new(customizations);
        assert_eq!(enabled.find_override(&site), Some(&MemberOverride::Removed));

        let disabled = FirstPartySetsContextConfig::disabled();
        assert_eq!(disabled.find_override(&site), None);
    }

    #[test]
    fn tombstone_is_distinct_from_absence() {
        let primary = Site::new("https://primary.test");
        let removed = Site::new("https://removed.test");
        let untouched = Site::new("https://untouched.test");

        let mut customizations = PolicyCustomization::new();
        customizations.insert(
            primary.clone(),
            MemberOverride::Member(SetEntry::primary(primary.clone())),
        );
        customizations.insert(removed.clone(), MemberOverride::Removed);

        let config = FirstPartySetsContextConfig::new(customizations);
        assert!(matches!(
            config.find_override(&primary),
            Some(MemberOverride::Member(_))
        ));
        assert_eq!(config.find_override(&removed), Some(&MemberOverride::Removed));
        assert_eq!(config.find_override(&untouched), None);
    }
}
