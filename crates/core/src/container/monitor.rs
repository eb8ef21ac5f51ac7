use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use uuid::Uuid;

use crate::errors::CoreError;

thread_local! {
    static RESOLUTION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

#[derive(Debug, Default)]
struct MonitorState {
    /// Binding id -> thread currently resolving it
    owners: HashMap<Uuid, ThreadId>,
    /// Thread -> binding id it is waiting to resolve
    waiting: HashMap<ThreadId, Uuid>,
}

impl MonitorState {
    /// Follow the wait-for chain starting at `owner`; reaching `me` means
    /// waiting would never end.
    fn closes_cycle(&self, me: ThreadId, owner: ThreadId) -> bool {
        let mut current = owner;
        for _ in 0..=self.waiting.len() {
            if current == me {
                return true;
            }
            match self
                .waiting
                .get(&current)
                .and_then(|binding| self.owners.get(binding))
            {
                Some(next) => current = *next,
                None => return false,
            }
        }
        false
    }
}

/// Tracks which thread is resolving which binding
///
/// A binding is resolved by at most one thread at a time. Re-entering a
/// binding on the thread that already owns it is a dependency cycle; a
/// different thread blocks until the owner is done, unless blocking would
/// close a cross-thread wait cycle, which is reported as a dependency cycle
/// as well.
#[derive(Debug, Default)]
pub struct ResolutionMonitor {
    state: Mutex<MonitorState>,
    released: Condvar,
}

impl ResolutionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `binding` as resolving on the current thread
    pub fn enter(&self, binding: Uuid, name: &str) -> Result<ResolutionGuard<'_>, CoreError> {
        let me = thread::current().id();
        let mut state = self.lock()?;

        loop {
            match state.owners.get(&binding).copied() {
                None => {
                    state.waiting.remove(&me);
                    state.owners.insert(binding, me);
                    return Ok(ResolutionGuard {
                        monitor: self,
                        binding,
                    });
                }
                Some(owner) if owner == me => {
                    return Err(CoreError::cyclic_dependency(name));
                }
                Some(owner) => {
                    if state.closes_cycle(me, owner) {
                        state.waiting.remove(&me);
                        return Err(CoreError::cyclic_dependency(name));
                    }
                    tracing::trace!(binding = name, "waiting for resolution on another thread");
                    state.waiting.insert(me, binding);
                    state = self
                        .released
                        .wait(state)
                        .map_err(|_| CoreError::lock("resolution_monitor"))?;
                }
            }
        }
    }

    /// Whether any thread is currently resolving `binding`
    pub fn is_resolving(&self, binding: &Uuid) -> bool {
        self.state
            .lock()
            .map(|state| state.owners.contains_key(binding))
            .unwrap_or(false)
    }

    /// Number of bindings currently being resolved, across all threads
    pub fn active_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.owners.len())
            .unwrap_or(0)
    }

    /// Number of threads blocked waiting for another thread's resolution
    pub fn waiting_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.waiting.len())
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MonitorState>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::lock("resolution_monitor"))
    }

    fn release(&self, binding: &Uuid) {
        // Releasing must happen on every exit path, poisoned or not.
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.owners.remove(binding);
        drop(state);
        self.released.notify_all();
    }
}

/// Scoped "resolving" marker; dropping it releases the binding
#[derive(Debug)]
pub struct ResolutionGuard<'a> {
    monitor: &'a ResolutionMonitor,
    binding: Uuid,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.monitor.release(&self.binding);
    }
}

/// Per-thread nesting depth of binding resolutions
#[derive(Debug)]
pub struct DepthGuard {
    _private: (),
}

impl DepthGuard {
    pub fn enter(name: &str, max_depth: usize) -> Result<Self, CoreError> {
        RESOLUTION_DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > max_depth {
                return Err(CoreError::DepthExceeded {
                    name: name.to_string(),
                    depth: max_depth,
                });
            }
            depth.set(next);
            Ok(Self { _private: () })
        })
    }

    /// Current nesting depth on this thread
    pub fn current() -> usize {
        RESOLUTION_DEPTH.with(Cell::get)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        RESOLUTION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
