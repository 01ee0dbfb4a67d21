//! Transposition table
//!
//! Maps zobrist keys to score bounds. Entries carry the depth they were
//! searched to; a probe only trusts entries at least as deep as the current
//! request, and a store only replaces a shallower entry. Nothing is ever
//! purged; the table lives as long as its agent.

use rustc_hash::FxHashMap;

/// Score bounds for one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtEntry {
    pub lowerbound: f64,
    pub upperbound: f64,
    pub depth: u32,
}

impl TtEntry {
    #[must_use]
    pub fn new(depth: u32) -> Self {
        Self {
            lowerbound: f64::NEG_INFINITY,
            upperbound: f64::INFINITY,
            depth,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<u64, TtEntry>,
}

impl TranspositionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds for `key`, if stored at depth >= `depth`. A shallower entry
    /// is stale for this request and ignored (but kept).
    #[must_use]
    pub fn probe(&self, key: u64, depth: u32) -> Option<TtEntry> {
        self.entries.get(&key).copied().filter(|n| n.depth >= depth)
    }

    /// Depth stored for `key`, regardless of staleness.
    #[must_use]
    pub fn stored_depth(&self, key: u64) -> Option<u32> {
        self.entries.get(&key).map(|n| n.depth)
    }

    /// Store `entry` unless an entry at equal or greater depth exists.
    pub fn store(&mut self, key: u64, entry: TtEntry) {
        match self.entries.get(&key) {
            Some(old) if entry.depth <= old.depth => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_respects_depth() {
        let mut tt = TranspositionTable::new();
        let mut entry = TtEntry::new(2);
        entry.lowerbound = 3.0;
        entry.upperbound = 3.0;
        tt.store(0xdead, entry);

        assert!(tt.probe(0xdead, 3).is_none());
        assert_eq!(tt.probe(0xdead, 2), Some(entry));
        assert_eq!(tt.probe(0xdead, 1), Some(entry));
        assert!(tt.probe(0xbeef, 0).is_none());
    }

    #[test]
    fn test_store_keeps_deepest() {
        let mut tt = TranspositionTable::new();
        let mut deep = TtEntry::new(4);
        deep.lowerbound = 7.0;
        tt.store(1, deep);

        let shallow = TtEntry::new(1);
        tt.store(1, shallow);
        assert_eq!(tt.probe(1, 4), Some(deep));

        let mut deeper = TtEntry::new(5);
        deeper.upperbound = 2.0;
        tt.store(1, deeper);
        assert_eq!(tt.probe(1, 5), Some(deeper));
        assert_eq!(tt.len(), 1);
    }
}
