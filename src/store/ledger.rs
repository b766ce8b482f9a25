use std::collections::{BTreeMap, HashSet};

use anyhow::Result;

use crate::error::StorageDecodeError;
use crate::store::kv::KeyValueStore;

pub const LEDGER_KEY: &str = "wrong_ledger";

/// Question id -> number of recorded wrong answers. Counts are always >= 1.
pub type LedgerMap = BTreeMap<String, u32>;

/// Persistent wrong-answer ledger. Reads go to the backing store every time,
/// so the ledger never drifts from what is persisted.
pub struct WrongLedger {
    store: Box<dyn KeyValueStore>,
}

fn decode(raw: &str) -> Result<LedgerMap, StorageDecodeError> {
    let mut map: LedgerMap = serde_json::from_str(raw)?;
    map.retain(|_, count| *count > 0);
    Ok(map)
}

impl WrongLedger {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current mapping. Unreadable content yields an empty mapping.
    pub fn get(&self) -> LedgerMap {
        let Some(raw) = self.store.read(LEDGER_KEY) else {
            return LedgerMap::new();
        };
        match decode(&raw) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "treating wrong-answer ledger as empty");
                LedgerMap::new()
            }
        }
    }

    /// Record one more wrong answer for `id`; returns the new count.
    pub fn increment(&self, id: &str) -> Result<u32> {
        let mut map = self.get();
        let count = map.entry(id.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        let count = *count;
        self.persist(&map)?;
        Ok(count)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(LEDGER_KEY)
    }

    /// Number of distinct ids with at least one wrong answer, stale ids included.
    pub fn count(&self) -> usize {
        self.get().len()
    }

    /// Drop entries whose id is not in `known`. Returns how many were dropped.
    pub fn retain_known<'a>(&self, known: impl IntoIterator<Item = &'a str>) -> Result<usize> {
        let known: HashSet<&str> = known.into_iter().collect();
        let mut map = self.get();
        let before = map.len();
        map.retain(|id, _| known.contains(id.as_str()));
        let dropped = before - map.len();
        if dropped > 0 {
            self.persist(&map)?;
        }
        Ok(dropped)
    }

    fn persist(&self, map: &LedgerMap) -> Result<()> {
        let json = serde_json::to_string(map)?;
        self.store.write(LEDGER_KEY, &json)
    }
}
