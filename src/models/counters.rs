// Absolute counters and the rates derived from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A monitored source identified by name (block device or network interface).
pub type Entity = String;

/// Two absolute, monotonically increasing counters for one entity,
/// e.g. bytes read / bytes written or bytes received / bytes transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterPair {
    pub a: u64,
    pub b: u64,
}

impl CounterPair {
    pub fn new(a: u64, b: u64) -> Self {
        Self { a, b }
    }
}

/// Counters for every entity of one family, captured at `timestamp_ms`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CounterSnapshot {
    pub timestamp_ms: u64,
    pub counters: BTreeMap<Entity, CounterPair>,
}

impl CounterSnapshot {
    pub fn new(timestamp_ms: u64, counters: BTreeMap<Entity, CounterPair>) -> Self {
        Self {
            timestamp_ms,
            counters,
        }
    }

    pub fn get(&self, entity: &str) -> Option<&CounterPair> {
        self.counters.get(entity)
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Per-entity rate in MB/s, one value per counter of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rate {
    pub a: f64,
    pub b: f64,
}

impl Rate {
    pub const ZERO: Rate = Rate { a: 0.0, b: 0.0 };

    pub fn max(&self) -> f64 {
        self.a.max(self.b)
    }
}

/// Rates for the entities present in two consecutive snapshots.
/// Iterates in lexicographic entity order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateSample {
    pub rates: BTreeMap<Entity, Rate>,
}

impl RateSample {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: &str) -> Option<&Rate> {
        self.rates.get(entity)
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.rates.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Entity, &Rate)> {
        self.rates.iter()
    }
}
