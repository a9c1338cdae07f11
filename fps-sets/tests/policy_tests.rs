use fps_sets::{compute_enterprise_customizations, PublicSets};
use fps_types::{
    Aliases, FlattenedSets, MemberOverride, ParsedPolicySetLists, PolicyCustomization, SetEntry,
    SingleSet, Site, SiteType,
};
use pretty_assertions::assert_eq;

fn site(s: &str) -> Site {
    Site::new(s)
}

fn policy_set(primary: &str, members: &[&str]) -> SingleSet {
    SingleSet::new(
        site(primary),
        members
            .iter()
            .map(|m| (site(m), SiteType::Associated))
            .collect(),
    )
    .unwrap()
}

fn public_group(entries: &mut FlattenedSets, primary: &str, members: &[&str]) {
    entries.insert(site(primary), SetEntry::primary(site(primary)));
    for (index, member) in members.iter().enumerate() {
        entries.insert(
            site(member),
            SetEntry::new(site(primary), SiteType::Associated, Some(index as u32)),
        );
    }
}

fn member_of(primary: &str) -> MemberOverride {
    MemberOverride::Member(SetEntry::associated(site(primary)))
}

fn primary_of(primary: &str) -> MemberOverride {
    MemberOverride::Member(SetEntry::primary(site(primary)))
}

#[test]
fn empty_policy_yields_empty_customizations() {
    let mut entries = FlattenedSets::new();
    public_group(&mut entries, "https://p1.test", &["https://m1.test"]);
    let sets = PublicSets::new(entries, Aliases::new());

    let config = compute_enterprise_customizations(&sets, &ParsedPolicySetLists::default());
    assert!(config.enabled());
    assert!(config.customizations().is_empty());
}

#[test]
fn pure_addition_with_no_public_overlap() {
    let sets = PublicSets::new(FlattenedSets::new(), Aliases::new());
    let policy = ParsedPolicySetLists {
        replacements: vec![],
        additions: vec![policy_set("https://pa.test", &["https://ma.test"])],
    };

    let config = compute_enterprise_customizations(&sets, &policy);

    let mut expected = PolicyCustomization::new();
    expected.insert(site("https://pa.test"), primary_of("https://pa.test"));
    expected.insert(site("https://ma.test"), member_of("https://pa.test"));
    assert_eq!(config.customizations(), &expected);
}

#[test]
fn addition_absorbs_existing_set() {
    let mut entries = FlattenedSets::new();
    public_group(&mut entries, "https://p1.test", &["https://m2.test"]);
    let sets = PublicSets::new(entries, Aliases::new());

    let policy = ParsedPolicySetLists {
        replacements: vec![],
        additions: vec![policy_set(
            "https://m2.test",
            &["https://m2a.test", "https://m2b.test"],
        )],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    let mut expected = PolicyCustomization::new();
    expected.insert(site("https://p1.test"), member_of("https://m2.test"));
    expected.insert(site("https://m2a.test"), member_of("https://m2.test"));
    expected.insert(site("https://m2b.test"), member_of("https://m2.test"));
    expected.insert(site("https://m2.test"), primary_of("https://m2.test"));
    assert_eq!(config.customizations(), &expected);
}

#[test]
fn replacement_orphans_primary_into_singleton() {
    let mut entries = FlattenedSets::new();
    public_group(&mut entries, "https://p1.test", &["https://m1.test"]);
    let sets = PublicSets::new(entries, Aliases::new());

    let policy = ParsedPolicySetLists {
        replacements: vec![policy_set("https://p3.test", &["https://m1.test"])],
        additions: vec![],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    let mut expected = PolicyCustomization::new();
    expected.insert(site("https://m1.test"), member_of("https://p3.test"));
    expected.insert(site("https://p3.test"), primary_of("https://p3.test"));
    expected.insert(site("https://p1.test"), MemberOverride::Removed);
    assert_eq!(config.customizations(), &expected);
}

#[test]
fn surviving_member_keeps_owner_out_of_singleton_pruning() {
    let mut entries = FlattenedSets::new();
    public_group(
        &mut entries,
        "https://p1.test",
        &["https://m1.test", "https://m2.test"],
    );
    let sets = PublicSets::new(entries, Aliases::new());

    let policy = ParsedPolicySetLists {
        replacements: vec![policy_set("https://p3.test", &["https://m1.test"])],
        additions: vec![],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    // m2 still belongs to p1, so p1 is not a singleton and neither
    // site appears in the customizations.
    let mut expected = PolicyCustomization::new();
    expected.insert(site("https://m1.test"), member_of("https://p3.test"));
    expected.insert(site("https://p3.test"), primary_of("https://p3.test"));
    assert_eq!(config.customizations(), &expected);
}

#[test]
fn replacing_a_public_primary_tombstones_uncovered_members() {
    let mut entries = FlattenedSets::new();
    public_group(
        &mut entries,
        "https://p1.test",
        &["https://m1.test", "https://m2.test"],
    );
    let sets = PublicSets::new(entries, Aliases::new());

    let policy = ParsedPolicySetLists {
        replacements: vec![policy_set("https://p1.test", &["https://m1.test"])],
        additions: vec![],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    let mut expected = PolicyCustomization::new();
    expected.insert(site("https://p1.test"), primary_of("https://p1.test"));
    expected.insert(site("https://m1.test"), member_of("https://p1.test"));
    // m2's owner was replaced and nothing claimed m2.
    expected.insert(site("https://m2.test"), MemberOverride::Removed);
    assert_eq!(config.customizations(), &expected);
}

#[test]
fn colliding_additions_merge_with_earliest_primary_winning() {
    let sets = PublicSets::new(FlattenedSets::new(), Aliases::new());
    let policy = ParsedPolicySetLists {
        replacements: vec![],
        additions: vec![
            policy_set("https://pa.test", &["https://shared.test"]),
            policy_set("https://pb.test", &["https://shared.test", "https://mb.test"]),
        ],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    let mut expected = PolicyCustomization::new();
    expected.insert(site("https://pa.test"), primary_of("https://pa.test"));
    expected.insert(site("https://shared.test"), member_of("https://pa.test"));
    expected.insert(site("https://pb.test"), member_of("https://pa.test"));
    expected.insert(site("https://mb.test"), member_of("https://pa.test"));
    assert_eq!(config.customizations(), &expected);
}

#[test]
fn addition_primary_referenced_as_member_elsewhere_merges() {
    let sets = PublicSets::new(FlattenedSets::new(), Aliases::new());
    let policy = ParsedPolicySetLists {
        replacements: vec![],
        additions: vec![
            policy_set("https://pa.test", &["https://pb.test"]),
            policy_set("https://pb.test", &["https://mb.test"]),
        ],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    let mut expected = PolicyCustomization::new();
    expected.insert(site("https://pa.test"), primary_of("https://pa.test"));
    expected.insert(site("https://pb.test"), member_of("https://pa.test"));
    expected.insert(site("https://mb.test"), member_of("https://pa.test"));
    assert_eq!(config.customizations(), &expected);
}

#[test]
fn later_addition_bridges_two_disjoint_groups() {
    let sets = PublicSets::new(FlattenedSets::new(), Aliases::new());
    let policy = ParsedPolicySetLists {
        replacements: vec![],
        additions: vec![
            policy_set("https://pa.test", &["https://ma.test"]),
            policy_set("https://pb.test", &["https://mb.test"]),
            policy_set("https://pc.test", &["https://ma.test", "https://mb.test"]),
        ],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    // Everything collapses into pa's group, the earliest declared.
    let mut expected = PolicyCustomization::new();
    expected.insert(site("https://pa.test"), primary_of("https://pa.test"));
    expected.insert(site("https://ma.test"), member_of("https://pa.test"));
    expected.insert(site("https://pb.test"), member_of("https://pa.test"));
    expected.insert(site("https://mb.test"), member_of("https://pa.test"));
    expected.insert(site("https://pc.test"), member_of("https://pa.test"));
    assert_eq!(config.customizations(), &expected);
}

#[test]
fn replacements_are_not_normalized_against_each_other() {
    let sets = PublicSets::new(FlattenedSets::new(), Aliases::new());
    let policy = ParsedPolicySetLists {
        replacements: vec![
            policy_set("https://pa.test", &["https://shared.test"]),
            policy_set("https://pb.test", &["https://shared.test"]),
        ],
        additions: vec![],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    // Later flattened entries overwrite earlier ones for the shared
    // site; no transitive merge happens.
    assert_eq!(
        config.customizations().get(&site("https://pa.test")),
        Some(&primary_of("https://pa.test")),
    );
    assert_eq!(
        config.customizations().get(&site("https://pb.test")),
        Some(&primary_of("https://pb.test")),
    );
    assert_eq!(
        config.customizations().get(&site("https://shared.test")),
        Some(&member_of("https://pb.test")),
    );
}

#[test]
fn policy_entry_wins_over_addition_reparenting() {
    let mut entries = FlattenedSets::new();
    public_group(&mut entries, "https://p1.test", &["https://m2.test"]);
    let sets = PublicSets::new(entries, Aliases::new());

    let policy = ParsedPolicySetLists {
        replacements: vec![policy_set("https://pr.test", &["https://p1.test"])],
        additions: vec![policy_set("https://m2.test", &["https://m2a.test"])],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    // p1's group is absorbed by the addition, but p1 itself is named
    // by a replacement, which is authoritative.
    assert_eq!(
        config.customizations().get(&site("https://p1.test")),
        Some(&member_of("https://pr.test")),
    );
    assert_eq!(
        config.customizations().get(&site("https://m2.test")),
        Some(&primary_of("https://m2.test")),
    );
    assert_eq!(
        config.customizations().get(&site("https://m2a.test")),
        Some(&member_of("https://m2.test")),
    );
}

#[test]
fn policy_entries_never_carry_site_indices() {
    let mut entries = FlattenedSets::new();
    public_group(&mut entries, "https://p1.test", &["https://m1.test"]);
    let sets = PublicSets::new(entries, Aliases::new());

    let policy = ParsedPolicySetLists {
        replacements: vec![policy_set(
            "https://p3.test",
            &["https://m1.test", "https://m3.test"],
        )],
        additions: vec![],
    };
    let config = compute_enterprise_customizations(&sets, &policy);

    for overridden in config.customizations().values() {
        if let MemberOverride::Member(entry) = overridden {
            assert_eq!(entry.site_index, None);
        }
    }
}
