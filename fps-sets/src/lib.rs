//! Set-merge, policy overlay, and diff engine for First-Party Sets.
//!
//! Given the globally published list of site groupings, a locally
//! declared override group, and a per-context enterprise policy, this
//! crate computes one consistent mapping from site to group membership
//! and the set of sites whose effective owner changed between two
//! snapshots.
//!
//! # Components
//!
//! - [`PublicSets`] — the canonical site→entry map plus its alias
//!   table, with a one-shot merge for the local override declaration
//! - [`compute_enterprise_customizations`] — turns enterprise
//!   replacement/addition set lists into a per-context override map
//! - [`compute_sets_diff`] — compares two (sets, policy) snapshots and
//!   returns the sites whose effective owner changed
//! - [`FirstPartySetsContextConfig`] — the per-context overlay the
//!   other two components produce and consume
//!
//! All of it is pure, synchronous, single-threaded computation; the
//! async coordination around it lives in `fps-gate`.

mod config;
mod diff;
mod policy;
mod public_sets;

pub use config::FirstPartySetsContextConfig;
pub use diff::compute_sets_diff;
pub use policy::compute_enterprise_customizations;
pub use public_sets::PublicSets;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Contract violations surfaced by the merge engine.
///
/// These are programming errors on the caller's side, checked before
/// any mutation so a rejected call leaves the receiver untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("a manually specified set was already applied to this instance")]
    SetAlreadyApplied,
}
