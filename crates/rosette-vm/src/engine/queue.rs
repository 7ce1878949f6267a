//! Sub-engine queues and the coordination trait.
//!
//! Leftfix, infix and suffix engines are opaque to the interpreter. Triggers
//! append events to the engine's queue in scan state; an external scheduler
//! drains active queues and advances the engines. Checks and SOM acquisition
//! query the engine through [`SubEngines`], handing it the queue's pending
//! events so it can catch up first.

use rosette_bytecode::{MQE_TOP, QueueIndex, ReportId};

use super::bitset::DynamicBitSet;

/// One pending sub-engine event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct QueueEvent {
    /// `MQE_*` event code.
    pub event: u32,
    /// Absolute offset the event happened at.
    pub location: u64,
    pub som: Option<u64>,
}

impl QueueEvent {
    /// Whether this event activates the engine (a top of any kind).
    pub fn is_top(&self) -> bool {
        self.event >= MQE_TOP
    }
}

/// Pending events of a single engine, in push order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventQueue {
    events: Vec<QueueEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: QueueEvent) {
        self.events.push(event);
    }

    /// Drop pending tops, keeping control events.
    pub fn cancel_tops(&mut self) {
        self.events.retain(|e| !e.is_top());
    }

    pub fn events(&self) -> &[QueueEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return all pending events.
    pub fn take(&mut self) -> Vec<QueueEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// All engine queues of a scan plus the set of queues holding events.
#[derive(Clone, Debug)]
pub struct QueueTable {
    queues: Vec<EventQueue>,
    active: DynamicBitSet,
}

impl QueueTable {
    pub fn new(count: usize) -> Self {
        Self {
            queues: vec![EventQueue::default(); count],
            active: DynamicBitSet::empty(count),
        }
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    pub fn push(&mut self, queue: QueueIndex, event: QueueEvent) {
        self.queues[queue.get()].push(event);
        self.active.set(queue.get());
    }

    pub fn cancel_tops(&mut self, queue: QueueIndex) {
        let q = &mut self.queues[queue.get()];
        q.cancel_tops();
        if q.is_empty() {
            self.active.unset(queue.get());
        }
    }

    pub fn queue(&self, queue: QueueIndex) -> &EventQueue {
        &self.queues[queue.get()]
    }

    pub fn is_active(&self, queue: QueueIndex) -> bool {
        self.active.is_set(queue.get())
    }

    /// Queues holding pending events, in index order.
    pub fn active(&self) -> impl Iterator<Item = QueueIndex> + '_ {
        self.active.iter().map(|i| QueueIndex(i as u32))
    }

    /// Hand a queue's events to `f`, then refresh its active bit.
    pub fn engage<R>(&mut self, queue: QueueIndex, f: impl FnOnce(&mut EventQueue) -> R) -> R {
        let idx = queue.get();
        let result = f(&mut self.queues[idx]);
        if self.queues[idx].is_empty() {
            self.active.unset(idx);
        } else {
            self.active.set(idx);
        }
        result
    }

    /// Remove and return a queue's events; the queue becomes inactive.
    pub fn drain(&mut self, queue: QueueIndex) -> Vec<QueueEvent> {
        self.active.unset(queue.get());
        self.queues[queue.get()].take()
    }

    pub fn clear(&mut self) {
        for q in &mut self.queues {
            q.clear();
        }
        self.active.clear();
    }
}

/// Arena of sub-engines addressed by queue index.
pub trait SubEngines {
    /// Whether the engine on `queue` accepts `report` at `location`.
    fn in_accept(
        &mut self,
        queue: QueueIndex,
        pending: &mut EventQueue,
        report: ReportId,
        location: u64,
    ) -> bool;

    /// Earliest start tracked by the engine on `queue` at `location`.
    fn som(&mut self, queue: QueueIndex, pending: &mut EventQueue, location: u64) -> u64;
}

/// Empty arena: never accepts, reports SOM at the queried location.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEngines;

impl SubEngines for NoEngines {
    fn in_accept(
        &mut self,
        _queue: QueueIndex,
        _pending: &mut EventQueue,
        _report: ReportId,
        _location: u64,
    ) -> bool {
        false
    }

    fn som(&mut self, _queue: QueueIndex, _pending: &mut EventQueue, location: u64) -> u64 {
        location
    }
}
