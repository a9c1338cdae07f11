//! The readiness gate state machine.

use crate::{Error, Result};
use fps_sets::PublicSets;
use fps_types::LocalSetDeclaration;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

/// Which phase the gate is in. Transitions are one-way:
/// `Uninitialized → AwaitingInputs → Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    /// No local declaration received yet.
    Uninitialized,
    /// Local declaration stored; waiting for the published list.
    AwaitingInputs,
    /// Merge ran; the sets are immutable from here on.
    Ready,
}

enum State {
    Uninitialized,
    AwaitingInputs(LocalSetDeclaration),
    Ready(Arc<PublicSets>),
}

struct Inner {
    state: State,
    waiters: VecDeque<oneshot::Sender<Arc<PublicSets>>>,
}

/// Coordinates the one-time construction of the merged [`PublicSets`].
///
/// Owned by whatever owns process lifetime and handed by reference to
/// consumers. All bookkeeping sits behind one mutex with short
/// critical sections; enqueued waiters are resolved outside the lock.
pub struct FirstPartySetsGate {
    inner: Mutex<Inner>,
}

impl Default for FirstPartySetsGate {
    fn default() -> Self {
        Self::new()
    }
}

impl FirstPartySetsGate {
    /// Creates a gate in the `Uninitialized` phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: State::Uninitialized,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// The current phase, for observability only; it may be stale by
    /// the time the caller looks at it.
    #[must_use]
    pub fn phase(&self) -> GatePhase {
        match self.lock().state {
            State::Uninitialized => GatePhase::Uninitialized,
            State::AwaitingInputs(_) => GatePhase::AwaitingInputs,
            State::Ready(_) => GatePhase::Ready,
        }
    }

    /// Stores the local override declaration. Must be called exactly
    /// once, before the published list arrives.
    pub fn init(&self, local: LocalSetDeclaration) -> Result<()> {
        let mut inner = self.lock();
        match inner.state {
            State::Uninitialized => {
                debug!("gate initialized; awaiting published list");
                inner.state = State::AwaitingInputs(local);
                Ok(())
            }
            State::AwaitingInputs(_) | State::Ready(_) => Err(Error::AlreadyInitialized),
        }
    }

    /// Supplies the published list, runs the local-override merge
    /// exactly once, and resolves every enqueued waiter in FIFO order.
    ///
    /// Fails without touching any state if the gate is not awaiting
    /// inputs or if the merge rejects its preconditions.
    pub fn set_public_sets(&self, mut sets: PublicSets) -> Result<()> {
        let (merged, waiters) = {
            let mut inner = self.lock();
            let local = match &inner.state {
                State::Uninitialized => return Err(Error::NotInitialized),
                State::Ready(_) => return Err(Error::AlreadyReady),
                State::AwaitingInputs(local) => local,
            };
            sets.apply_manually_specified_set(local)?;
            let merged = Arc::new(sets);
            inner.state = State::Ready(Arc::clone(&merged));
            let waiters = std::mem::take(&mut inner.waiters);
            (merged, waiters)
        };

        debug!(waiters = waiters.len(), "gate ready; resolving waiters");
        for waiter in waiters {
            // A dropped receiver only means the querier went away.
            let _ = waiter.send(Arc::clone(&merged));
        }
        Ok(())
    }

    /// Returns the merged sets without waiting, or `None` if the gate
    /// is not ready yet.
    #[must_use]
    pub fn sets_now(&self) -> Option<Arc<PublicSets>> {
        match &self.lock().state {
            State::Ready(sets) => Some(Arc::clone(sets)),
            State::Uninitialized | State::AwaitingInputs(_) => None,
        }
    }

    /// Returns the merged sets, resolving immediately if the gate is
    /// ready and otherwise waiting (FIFO among waiters) until it is.
    pub async fn sets(&self) -> Arc<PublicSets> {
        let receiver = {
            let mut inner = self.lock();
            match &inner.state {
                State::Ready(sets) => return Arc::clone(sets),
                State::Uninitialized | State::AwaitingInputs(_) => {
                    let (sender, receiver) = oneshot::channel();
                    inner.waiters.push_back(sender);
                    receiver
                }
            }
        };
        // The sender lives in `self.waiters` until the gate resolves
        // it, and `self` outlives this borrow, so the channel cannot
        // close unresolved.
        receiver.await.expect("gate dropped its waiter list")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("gate mutex poisoned")
    }
}
