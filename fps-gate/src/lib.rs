//! Single-assignment readiness gate for the First-Party Sets engine.
//!
//! The merged [`fps_sets::PublicSets`] depends on two inputs that
//! arrive asynchronously at startup: the published set list and the
//! locally declared override. This crate coordinates the one-time
//! merge and answers membership queries both synchronously (when the
//! merge already ran) and deferred (FIFO, exactly once, before the
//! merge ran). There is no cancellation and no timeout: an enqueued
//! waiter resolves when the gate becomes ready, or never if the
//! process shuts down first.

mod gate;

pub use gate::{FirstPartySetsGate, GatePhase};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Contract violations in the gate's one-way state machine.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("the gate has not been initialized with a local declaration yet")]
    NotInitialized,

    #[error("the gate was already initialized")]
    AlreadyInitialized,

    #[error("the public set list was already supplied")]
    AlreadyReady,

    #[error(transparent)]
    Merge(#[from] fps_sets::Error),
}
