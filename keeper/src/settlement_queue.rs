//! Priority queue of sales awaiting settlement (min-heap by end time)

use curve_sale_common::{Address, UnixTimestamp};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Sale deadline snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSale {
    /// Sale instance address
    pub sale: Address,
    /// Creator the withdrawal pays out to
    pub creator: Address,
    /// First timestamp at which the sale is ended
    pub end_time: UnixTimestamp,
}

impl PendingSale {
    pub fn is_due(&self, now: UnixTimestamp) -> bool {
        now >= self.end_time
    }
}

/// End-time priority queue (min-heap: earliest deadline first)
pub struct SettlementQueue {
    queue: PriorityQueue<Address, Reverse<UnixTimestamp>>,
    map: HashMap<Address, PendingSale>,
}

impl SettlementQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or update a sale deadline
    pub fn push(&mut self, pending: PendingSale) {
        let sale = pending.sale;
        let end_time = pending.end_time;

        self.map.insert(sale, pending);
        self.queue.push(sale, Reverse(end_time));
    }

    /// Pop the sale with the earliest deadline
    pub fn pop(&mut self) -> Option<PendingSale> {
        let (sale, _priority) = self.queue.pop()?;
        self.map.remove(&sale)
    }

    pub fn peek(&self) -> Option<&PendingSale> {
        let (sale, _priority) = self.queue.peek()?;
        self.map.get(sale)
    }

    pub fn remove(&mut self, sale: &Address) -> Option<PendingSale> {
        self.queue.remove(sale);
        self.map.remove(sale)
    }

    /// Every sale whose window has closed at `now`, earliest first
    pub fn due(&self, now: UnixTimestamp) -> Vec<PendingSale> {
        let mut due: Vec<PendingSale> = self
            .map
            .values()
            .filter(|p| p.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|p| (p.end_time, p.sale));
        due
    }

    pub fn contains(&self, sale: &Address) -> bool {
        self.map.contains_key(sale)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for SettlementQueue {
    fn default() -> Self {
        Self::new()
    }
}
