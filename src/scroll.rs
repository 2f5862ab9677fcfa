use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{
    core::{clamp_progress, ensure_finite},
    error::{ScrubError, ScrubResult},
};

/// Anchor offsets delimiting the tracked span of a scrollable container, in
/// scroll-space pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollRange {
    start: f64,
    end: f64,
}

impl ScrollRange {
    pub fn new(start: f64, end: f64) -> ScrubResult<Self> {
        ensure_finite(start, "scroll range start")?;
        ensure_finite(end, "scroll range end")?;
        if start >= end {
            return Err(ScrubError::configuration(
                "scroll range start must be < end",
            ));
        }
        Ok(Self { start, end })
    }

    /// Anchor pair for a sticky container: progress runs from "container top
    /// reaches viewport top" to "container bottom reaches viewport bottom".
    pub fn for_container(
        container_top: f64,
        container_height: f64,
        viewport_height: f64,
    ) -> ScrubResult<Self> {
        ensure_finite(container_top, "container top")?;
        ensure_finite(container_height, "container height")?;
        ensure_finite(viewport_height, "viewport height")?;
        if container_height <= viewport_height {
            return Err(ScrubError::configuration(
                "container must be taller than the viewport to scrub",
            ));
        }
        Self::new(container_top, container_top + container_height - viewport_height)
    }

    pub fn start(self) -> f64 {
        self.start
    }

    pub fn end(self) -> f64 {
        self.end
    }

    /// Normalized position of `offset` within the range, clamped to [0, 1].
    pub fn progress(self, offset: f64) -> f64 {
        clamp_progress((offset - self.start) / (self.end - self.start))
    }
}

type Callback = Box<dyn FnMut(f64)>;

struct CellState {
    value: f64,
    next_id: u64,
    observers: Vec<(u64, Callback)>,
    /// Ids whose callback is currently checked out by a notify pass.
    in_flight: Vec<u64>,
    /// Ids unsubscribed while their callback was checked out.
    dead: Vec<u64>,
}

impl CellState {
    fn remove(&mut self, id: u64) {
        if let Some(pos) = self.observers.iter().position(|(oid, _)| *oid == id) {
            self.observers.remove(pos);
        } else if self.in_flight.contains(&id) && !self.dead.contains(&id) {
            self.dead.push(id);
        }
    }
}

/// Single-writer observable progress cell.
///
/// Subscribing fires the callback immediately with the current value, so a
/// consumer sees the mount state without waiting for the first scroll event.
/// Writes are serialized on the single event thread; there is no concurrent
/// write hazard, only re-entrancy (a callback subscribing or unsubscribing
/// during dispatch), which is supported.
#[derive(Clone)]
pub struct ProgressCell {
    state: Rc<RefCell<CellState>>,
}

impl ProgressCell {
    pub fn new(initial: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(CellState {
                value: clamp_progress(initial),
                next_id: 0,
                observers: Vec::new(),
                in_flight: Vec::new(),
                dead: Vec::new(),
            })),
        }
    }

    /// Point-in-time read of the current value.
    pub fn get(&self) -> f64 {
        self.state.borrow().value
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Register an observer and fire it once with the current value.
    ///
    /// The returned handle stops delivery when dropped or unsubscribed.
    pub fn subscribe(&self, mut callback: impl FnMut(f64) + 'static) -> Subscription {
        let value = self.get();
        callback(value);

        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.observers.push((id, Box::new(callback)));
            id
        };

        Subscription {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    /// Write a new value (clamped to [0, 1]) and notify every observer.
    ///
    /// Each callback is checked out of the observer list while it runs so the
    /// cell is never borrowed during user code; callbacks may subscribe or
    /// unsubscribe freely. Observers added during a notify pass do not see
    /// the in-flight value (they already saw it via immediate fire).
    pub fn set(&self, value: f64) {
        let value = clamp_progress(value);
        let ids: Vec<u64> = {
            let mut state = self.state.borrow_mut();
            state.value = value;
            state.observers.iter().map(|(id, _)| *id).collect()
        };

        for id in ids {
            let checked_out = {
                let mut state = self.state.borrow_mut();
                let pos = state.observers.iter().position(|(oid, _)| *oid == id);
                let entry = pos.map(|pos| state.observers.remove(pos));
                if entry.is_some() {
                    state.in_flight.push(id);
                }
                entry
            };
            let Some((id, mut cb)) = checked_out else {
                // Unsubscribed by an earlier callback in this pass.
                continue;
            };

            cb(value);

            let mut state = self.state.borrow_mut();
            if let Some(pos) = state.in_flight.iter().position(|f| *f == id) {
                state.in_flight.remove(pos);
            }
            if let Some(pos) = state.dead.iter().position(|d| *d == id) {
                state.dead.remove(pos);
            } else {
                state.observers.push((id, cb));
            }
        }
    }
}

/// Handle owning one observer registration.
///
/// `unsubscribe` is idempotent and guarantees no further delivery; dropping
/// the handle has the same effect.
pub struct Subscription {
    state: Weak<RefCell<CellState>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().remove(self.id);
        }
        self.state = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
