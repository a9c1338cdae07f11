//! Core type definitions for the First-Party Sets engine.
//!
//! This crate defines the fundamental, engine-agnostic types shared by
//! the set-merge core and the readiness gate:
//! - Site identities (normalized scheme + registrable domain)
//! - Set membership entries and the flattened site→entry map
//! - Declared set groups (policy lists, local override declarations)
//! - Per-site membership overrides (member vs. explicit removal)
//!
//! Everything that *computes* over these types (merging, policy
//! overlays, diffing) belongs in `fps-sets`, not here.

mod declaration;
mod entry;
mod overrides;
mod site;

pub use declaration::{LocalSetDeclaration, ParsedPolicySetLists, SingleSet};
pub use entry::{Aliases, FlattenedSets, SetEntry, SiteType};
pub use overrides::{MemberOverride, PolicyCustomization};
pub use site::Site;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing set declarations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("site {0} is declared more than once in the same set")]
    DuplicateMember(Site),

    #[error("primary {0} is also listed as a member of its own set")]
    PrimaryListedAsMember(Site),
}
