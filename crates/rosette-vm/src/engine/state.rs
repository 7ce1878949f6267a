//! Scan-local state owned by one scan or stream.

use rosette_bytecode::{Program, ProgramOffset};

use super::bitset::DynamicBitSet;
use super::queue::QueueTable;
use super::sink::Match;

/// An anchored match held back until the floating matcher reaches `end`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Delayed {
    pub entry: ProgramOffset,
    pub end: u64,
}

/// Mutable bookkeeping shared by every program run of a scan.
///
/// Capacities come from the program, so every index a validated program
/// can name is in range.
#[derive(Clone, Debug)]
pub struct ScanState {
    handled: DynamicBitSet,
    roles: DynamicBitSet,
    depth: u8,
    groups: u64,
    initial_groups: u64,
    som_slots: Vec<Option<u64>>,
    queues: QueueTable,
    eod: Vec<Match>,
    delayed: Vec<Delayed>,
}

impl ScanState {
    pub fn new(program: &Program) -> Self {
        Self {
            handled: DynamicBitSet::empty(program.handled_key_count() as usize),
            roles: DynamicBitSet::empty(program.role_state_count() as usize),
            depth: 0,
            groups: program.initial_groups(),
            initial_groups: program.initial_groups(),
            som_slots: vec![None; program.som_slot_count() as usize],
            queues: QueueTable::new(program.queue_count() as usize),
            eod: Vec::new(),
            delayed: Vec::new(),
        }
    }

    /// Return to the state of a fresh scan.
    pub fn reset(&mut self) {
        self.handled.clear();
        self.roles.clear();
        self.depth = 0;
        self.groups = self.initial_groups;
        self.som_slots.fill(None);
        self.queues.clear();
        self.eod.clear();
        self.delayed.clear();
    }

    /// Test-and-set a handled key; returns whether it was already handled.
    pub(crate) fn mark_handled(&mut self, key: u32) -> bool {
        self.handled.test_and_set(key as usize)
    }

    pub fn is_handled(&self, key: u32) -> bool {
        self.handled.is_set(key as usize)
    }

    pub fn clear_handled(&mut self) {
        self.handled.clear();
    }

    pub(crate) fn set_role(&mut self, index: u32) {
        self.roles.set(index as usize);
    }

    pub fn is_role_set(&self, index: u32) -> bool {
        self.roles.is_set(index as usize)
    }

    pub fn roles(&self) -> &DynamicBitSet {
        &self.roles
    }

    /// Raise the delay high-water mark to cover `depth`.
    pub(crate) fn raise_depth(&mut self, depth: u8) {
        self.depth = self.depth.max(depth.saturating_add(1));
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub(crate) fn add_groups(&mut self, groups: u64) {
        self.groups |= groups;
    }

    /// Literal groups currently switched on; the pre-filter reads this.
    pub fn groups(&self) -> u64 {
        self.groups
    }

    /// Combine `som` into a slot; the earliest start wins.
    pub(crate) fn record_som(&mut self, slot: u32, som: u64) {
        let entry = &mut self.som_slots[slot as usize];
        *entry = Some(entry.map_or(som, |prev| prev.min(som)));
    }

    pub fn som_slot(&self, slot: u32) -> Option<u64> {
        self.som_slots.get(slot as usize).copied().flatten()
    }

    pub fn queues(&self) -> &QueueTable {
        &self.queues
    }

    pub fn queues_mut(&mut self) -> &mut QueueTable {
        &mut self.queues
    }

    pub(crate) fn defer_eod(&mut self, m: Match) {
        self.eod.push(m);
    }

    /// Matches waiting for the end-of-data flush.
    pub fn pending_eod(&self) -> &[Match] {
        &self.eod
    }

    pub(crate) fn take_eod(&mut self) -> Vec<Match> {
        std::mem::take(&mut self.eod)
    }

    /// Park the run of `entry` at `end`. A repeat of a pending pair is
    /// dropped.
    pub(crate) fn delay_anchored(&mut self, entry: ProgramOffset, end: u64) {
        let delayed = Delayed { entry, end };
        if !self.delayed.contains(&delayed) {
            self.delayed.push(delayed);
        }
    }

    /// Anchored matches waiting to be replayed, in arrival order.
    pub fn pending_delayed(&self) -> &[Delayed] {
        &self.delayed
    }

    /// Remove the delayed matches ending at or before `end`, ordered by end.
    pub(crate) fn take_delayed_through(&mut self, end: u64) -> Vec<Delayed> {
        let (mut ready, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.delayed)
            .into_iter()
            .partition(|d| d.end <= end);
        self.delayed = rest;
        ready.sort_by_key(|d| d.end);
        ready
    }
}
