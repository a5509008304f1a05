// Enumeration of monitored entities and their membership over time.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{Result, SampleError};
use crate::models::Entity;
use crate::reader::{parse, read_source};

/// Name prefixes of virtual block devices: loopback, compressed RAM, device-mapper.
const VIRTUAL_BLOCK_PREFIXES: [&str; 3] = ["loop", "zram", "dm-"];

pub fn is_virtual_block_device(name: &str) -> bool {
    VIRTUAL_BLOCK_PREFIXES.iter().any(|p| name.starts_with(p))
}

pub fn is_loopback_interface(name: &str) -> bool {
    name == parse::LOOPBACK_INTERFACE
}

/// Physical block devices under `<sys_root>/block`, in lexicographic order.
/// Re-read on every call so hot-plugged devices show up.
pub fn list_block_devices(sys_root: &Path) -> Result<BTreeSet<Entity>> {
    let dir = sys_root.join("block");
    let entries = std::fs::read_dir(&dir).map_err(|source| SampleError::SourceUnavailable {
        path: dir.clone(),
        source,
    })?;
    let mut devices = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| SampleError::SourceUnavailable {
            path: dir.clone(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_virtual_block_device(&name) {
            devices.insert(name);
        }
    }
    Ok(devices)
}

/// Network interfaces listed in `<proc_root>/net/dev`, loopback excluded.
/// Interfaces with a malformed counter line are still listed.
pub fn list_network_interfaces(proc_root: &Path) -> Result<BTreeSet<Entity>> {
    let path = proc_root.join("net").join("dev");
    let table = parse::parse_net_dev(&read_source(&path)?, &path)?;
    Ok(table
        .counters
        .into_keys()
        .chain(table.failures.into_iter().map(|(name, _)| name))
        .collect())
}

/// Entities that joined or left between two observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityChanges {
    pub appeared: Vec<Entity>,
    pub vanished: Vec<Entity>,
}

impl EntityChanges {
    pub fn is_empty(&self) -> bool {
        self.appeared.is_empty() && self.vanished.is_empty()
    }
}

/// Tracks which entities have been seen and how many consecutive
/// observations each one has been missing from.
///
/// Entities are never dropped on their own; callers decide when a missing
/// entity is stale and call [`EntityTracker::forget`].
#[derive(Debug, Clone, Default)]
pub struct EntityTracker {
    missed: BTreeMap<Entity, u32>,
}

impl EntityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe<'a, I>(&mut self, present: I) -> EntityChanges
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let present: BTreeSet<&Entity> = present.into_iter().collect();
        let mut changes = EntityChanges::default();

        for (name, missed) in self.missed.iter_mut() {
            if present.contains(name) {
                *missed = 0;
            } else {
                if *missed == 0 {
                    changes.vanished.push(name.clone());
                }
                *missed = missed.saturating_add(1);
            }
        }
        for name in present {
            if !self.missed.contains_key(name) {
                self.missed.insert(name.clone(), 0);
                changes.appeared.push(name.clone());
            }
        }
        changes
    }

    /// Consecutive observations `name` has been absent from; `None` if unknown.
    pub fn missed_ticks(&self, name: &str) -> Option<u32> {
        self.missed.get(name).copied()
    }

    /// Entities absent for at least `threshold` consecutive observations.
    pub fn stale(&self, threshold: u32) -> Vec<Entity> {
        self.missed
            .iter()
            .filter(|(_, missed)| **missed >= threshold && **missed > 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn forget(&mut self, name: &str) -> bool {
        self.missed.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.missed.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.missed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missed.is_empty()
    }
}
