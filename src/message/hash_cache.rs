//! Callsign hash table for resolving hashed callsign references
//!
//! Messages that carry a non-standard callsign often send only a 10, 12 or
//! 22-bit hash of it. A receiver that has seen the full callsign earlier can
//! turn the hash back into text. Every table stores the 22-bit hash; shorter
//! hashes are its upper bits.

use tracing::{trace, warn};

/// Number of slots in [`CallsignHashCache`]
pub const HASH_TABLE_SLOTS: usize = 256;

/// Width of a hashed callsign reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Bits10,
    Bits12,
    Bits22,
}

impl HashKind {
    /// Number of low bits of the 22-bit hash this kind drops
    fn shift(self) -> u32 {
        match self {
            HashKind::Bits10 => 12,
            HashKind::Bits12 => 10,
            HashKind::Bits22 => 0,
        }
    }
}

/// Storage for callsigns seen on air, keyed by their 22-bit hash
///
/// The message codec calls `save_hash` for callsigns it packs or decodes in full
/// and `lookup_hash` when it meets a hashed reference.
pub trait CallsignHashTable {
    fn lookup_hash(&self, kind: HashKind, hash: u32) -> Option<String>;
    fn save_hash(&mut self, callsign: &str, n22: u32);
}

/// A table that remembers nothing; hashed callsigns decode as `<...>`
impl CallsignHashTable for () {
    fn lookup_hash(&self, _kind: HashKind, _hash: u32) -> Option<String> {
        None
    }

    fn save_hash(&mut self, _callsign: &str, _n22: u32) {}
}

#[derive(Debug, Clone)]
struct Slot {
    callsign: String,
    n22: u32,
}

/// Fixed-size open addressing table with linear probing
///
/// # Example
/// ```
/// use rustyftx::message::hash_cache::{CallsignHashCache, CallsignHashTable, HashKind};
///
/// let mut cache = CallsignHashCache::new();
/// cache.save_hash("KH1/KH7Z", 825805);
/// assert_eq!(cache.lookup_hash(HashKind::Bits12, 806).as_deref(), Some("KH1/KH7Z"));
/// assert_eq!(cache.lookup_hash(HashKind::Bits10, 201).as_deref(), Some("KH1/KH7Z"));
/// ```
#[derive(Debug, Clone)]
pub struct CallsignHashCache {
    slots: Vec<Option<Slot>>,
}

impl Default for CallsignHashCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CallsignHashCache {
    pub fn new() -> Self {
        Self {
            slots: vec![None; HASH_TABLE_SLOTS],
        }
    }

    fn start_slot(n22: u32) -> usize {
        (((n22 >> 12) as usize) * 23) % HASH_TABLE_SLOTS
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

impl CallsignHashTable for CallsignHashCache {
    fn lookup_hash(&self, kind: HashKind, hash: u32) -> Option<String> {
        let shift = kind.shift();
        // every width shares the upper 10 bits that select the start slot
        let top10 = match kind {
            HashKind::Bits10 => hash,
            HashKind::Bits12 => hash >> 2,
            HashKind::Bits22 => hash >> 12,
        };
        let start = (top10 as usize * 23) % HASH_TABLE_SLOTS;

        for i in 0..HASH_TABLE_SLOTS {
            let idx = (start + i) % HASH_TABLE_SLOTS;
            match &self.slots[idx] {
                None => return None,
                Some(slot) if slot.n22 >> shift == hash => {
                    trace!(callsign = %slot.callsign, hash, ?kind, "hash lookup hit");
                    return Some(slot.callsign.clone());
                }
                Some(_) => {}
            }
        }
        None
    }

    fn save_hash(&mut self, callsign: &str, n22: u32) {
        let start = Self::start_slot(n22);
        for i in 0..HASH_TABLE_SLOTS {
            let idx = (start + i) % HASH_TABLE_SLOTS;
            match &mut self.slots[idx] {
                Some(slot) if slot.n22 == n22 => {
                    if slot.callsign != callsign {
                        trace!(old = %slot.callsign, new = %callsign, n22, "hash collision, replacing");
                        slot.callsign = callsign.to_string();
                    }
                    return;
                }
                Some(_) => {}
                empty @ None => {
                    *empty = Some(Slot {
                        callsign: callsign.to_string(),
                        n22,
                    });
                    return;
                }
            }
        }

        warn!(callsign, n22, "callsign hash table full, evicting");
        self.slots[start] = Some(Slot {
            callsign: callsign.to_string(),
            n22,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::callsign::{hash22, ihashcall};

    #[test]
    fn test_lookup_all_widths() {
        let mut cache = CallsignHashCache::new();
        for call in ["PJ4/K1ABC", "KH1/KH7Z", "W9XYZ/7", "VE5/N0YPR"] {
            cache.save_hash(call, hash22(call).unwrap());
        }
        for call in ["PJ4/K1ABC", "KH1/KH7Z", "W9XYZ/7", "VE5/N0YPR"] {
            assert_eq!(cache.lookup_hash(HashKind::Bits22, ihashcall(call, 22).unwrap()).as_deref(), Some(call));
            assert_eq!(cache.lookup_hash(HashKind::Bits12, ihashcall(call, 12).unwrap()).as_deref(), Some(call));
            assert_eq!(cache.lookup_hash(HashKind::Bits10, ihashcall(call, 10).unwrap()).as_deref(), Some(call));
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_known_hash_values() {
        let mut cache = CallsignHashCache::new();
        cache.save_hash("W9XYZ/7", 1973674);
        cache.save_hash("PJ4/K1ABC", 1420834);
        assert_eq!(cache.lookup_hash(HashKind::Bits12, 1927).as_deref(), Some("W9XYZ/7"));
        assert_eq!(cache.lookup_hash(HashKind::Bits12, 1387).as_deref(), Some("PJ4/K1ABC"));
    }

    #[test]
    fn test_missing_hash() {
        let mut cache = CallsignHashCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup_hash(HashKind::Bits22, 12345), None);
        cache.save_hash("K1ABC", hash22("K1ABC").unwrap());
        assert_eq!(cache.lookup_hash(HashKind::Bits22, 12345), None);
    }

    #[test]
    fn test_duplicate_save_is_ignored() {
        let mut cache = CallsignHashCache::new();
        cache.save_hash("K1ABC", 100);
        cache.save_hash("K1ABC", 100);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_hash_replaces_callsign() {
        let mut cache = CallsignHashCache::new();
        cache.save_hash("K1ABC", 100);
        cache.save_hash("W9XYZ", 100);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup_hash(HashKind::Bits22, 100).as_deref(), Some("W9XYZ"));
    }

    #[test]
    fn test_colliding_start_slots_probe_forward() {
        // identical upper bits share a start slot
        let mut cache = CallsignHashCache::new();
        cache.save_hash("AAA1", 0x1000);
        cache.save_hash("BBB2", 0x1001);
        cache.save_hash("CCC3", 0x1002);
        assert_eq!(cache.lookup_hash(HashKind::Bits22, 0x1002).as_deref(), Some("CCC3"));
        assert_eq!(cache.lookup_hash(HashKind::Bits22, 0x1000).as_deref(), Some("AAA1"));
    }

    #[test]
    fn test_full_table_evicts() {
        let mut cache = CallsignHashCache::new();
        for i in 0..HASH_TABLE_SLOTS as u32 {
            cache.save_hash(&format!("K{}A", i), i << 12);
        }
        assert_eq!(cache.len(), HASH_TABLE_SLOTS);
        cache.save_hash("N0YPR", (HASH_TABLE_SLOTS as u32) << 12);
        assert_eq!(cache.len(), HASH_TABLE_SLOTS);
        assert_eq!(
            cache.lookup_hash(HashKind::Bits22, (HASH_TABLE_SLOTS as u32) << 12).as_deref(),
            Some("N0YPR")
        );
    }

    #[test]
    fn test_clear() {
        let mut cache = CallsignHashCache::new();
        cache.save_hash("K1ABC", 100);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_null_table() {
        let mut table = ();
        table.save_hash("K1ABC", 100);
        assert_eq!(table.lookup_hash(HashKind::Bits22, 100), None);
    }
}
