// ── Response sequencing ──
//
// A slow response for an earlier request must not overwrite the view after
// a newer request for the same slot has been issued. Each load takes a
// ticket; only the newest ticket per key may apply its result.

use std::collections::HashMap;
use std::hash::Hash;

/// Proof that a request was issued, checked before applying its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket<K> {
    key: K,
    seq: u64,
}

impl<K: Copy> Ticket<K> {
    pub fn key(&self) -> K {
        self.key
    }
}

/// Hands out per-key increasing tickets.
#[derive(Debug, Clone)]
pub struct Sequencer<K> {
    latest: HashMap<K, u64>,
}

impl<K> Default for Sequencer<K> {
    fn default() -> Self {
        Self {
            latest: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> Sequencer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every earlier one for `key`.
    pub fn issue(&mut self, key: K) -> Ticket<K> {
        let seq = self.latest.entry(key).or_insert(0);
        *seq += 1;
        Ticket { key, seq: *seq }
    }

    /// Whether no newer ticket has been issued for the same key.
    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        self.latest.get(&ticket.key) == Some(&ticket.seq)
    }
}
