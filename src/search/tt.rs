//! Lock-free transposition table
//!
//! Caches search results keyed by Zobrist hash so positions reached
//! by different move orders are evaluated once. The table is shared
//! by the parallel root workers, so slots are atomic.
//!
//! Uses the XOR trick (Hyatt 1994): each slot stores `(key, data)`
//! with `key = hash ^ data`. A probe recomputes `key ^ data` and
//! treats any mismatch, including a torn read from a concurrent
//! writer, as a miss.

use std::sync::atomic::{AtomicU64, Ordering};

/// How a stored score relates to the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// The search completed inside the window.
    Exact,
    /// Score failed high: true value >= stored (beta cutoff).
    LowerBound,
    /// Score failed low: true value <= stored.
    UpperBound,
}

/// Pack an entry into a u64 for atomic storage.
///
/// Layout (48 bits used):
/// ```text
/// bits [0..8)    depth                          8 bits
/// bits [8..29)   score (+1_048_576 offset)     21 bits
/// bits [29..31)  entry_type (0=Exact,1=LB,2=UB) 2 bits
/// bit  [31]      has_move                       1 bit
/// bits [32..48)  best move cell index          16 bits
/// ```
fn pack_entry(depth: u8, score: i32, entry_type: EntryType, best_move: Option<usize>) -> u64 {
    let d = u64::from(depth);
    // Clamp to the 21-bit range [-1_048_575, 1_048_575]; search
    // scores stay well inside it.
    let clamped = score.clamp(-1_048_575, 1_048_575);
    let s = (i64::from(clamped) + 1_048_576) as u64 & 0x1F_FFFF;
    let t = match entry_type {
        EntryType::Exact => 0u64,
        EntryType::LowerBound => 1u64,
        EntryType::UpperBound => 2u64,
    };
    let (has_move, cell) = match best_move {
        Some(c) => (1u64, c as u64 & 0xFFFF),
        None => (0u64, 0u64),
    };
    d | (s << 8) | (t << 29) | (has_move << 31) | (cell << 32)
}

/// Unpack a u64 back into entry fields.
fn unpack_entry(data: u64) -> (u8, i32, EntryType, Option<usize>) {
    let depth = (data & 0xFF) as u8;
    let score = (((data >> 8) & 0x1F_FFFF) as i64 - 1_048_576) as i32;
    let entry_type = match (data >> 29) & 0x3 {
        0 => EntryType::Exact,
        1 => EntryType::LowerBound,
        _ => EntryType::UpperBound,
    };
    let best_move = if (data >> 31) & 1 != 0 {
        Some(((data >> 32) & 0xFFFF) as usize)
    } else {
        None
    };
    (depth, score, entry_type, best_move)
}

/// Shared transposition table. All methods take `&self`, so it can
/// sit behind an `Arc` without locking.
pub struct AtomicTT {
    keys: Vec<AtomicU64>,
    data: Vec<AtomicU64>,
    size: usize,
}

impl AtomicTT {
    /// Create a table of the given size in megabytes (two u64 per slot).
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let slot_size = 16usize;
        let size = ((size_mb * 1024 * 1024) / slot_size).max(1024);

        let mut keys = Vec::with_capacity(size);
        let mut data = Vec::with_capacity(size);
        for _ in 0..size {
            keys.push(AtomicU64::new(0));
            data.push(AtomicU64::new(0));
        }
        Self { keys, data, size }
    }

    fn load(&self, hash: u64) -> Option<u64> {
        let idx = (hash as usize) % self.size;
        let key = self.keys[idx].load(Ordering::Relaxed);
        let raw = self.data[idx].load(Ordering::Relaxed);
        if key == 0 && raw == 0 {
            return None;
        }
        // Torn read fails the XOR check and counts as a miss.
        if key ^ raw != hash {
            return None;
        }
        Some(raw)
    }

    /// Probe for a score usable at exactly `depth` within the
    /// `alpha..beta` window. An entry searched to a different depth
    /// describes a different fixed-depth value and never answers, so
    /// every hit is reproducible; callers use
    /// [`get_best_move`](Self::get_best_move) for ordering on a miss.
    #[must_use]
    pub fn probe(&self, hash: u64, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        let raw = self.load(hash)?;
        let (entry_depth, score, entry_type, _) = unpack_entry(raw);

        if entry_depth == depth {
            match entry_type {
                EntryType::Exact => return Some(score),
                EntryType::LowerBound if score >= beta => return Some(score),
                EntryType::UpperBound if score <= alpha => return Some(score),
                _ => {}
            }
        }
        None
    }

    /// Best move recorded for this position, regardless of depth.
    #[must_use]
    pub fn get_best_move(&self, hash: u64) -> Option<usize> {
        let raw = self.load(hash)?;
        let (_, _, _, best_move) = unpack_entry(raw);
        best_move
    }

    /// Store a result. Depth-preferred replacement: a different
    /// position is only evicted by an equal or deeper search.
    pub fn store(
        &self,
        hash: u64,
        depth: u8,
        score: i32,
        entry_type: EntryType,
        best_move: Option<usize>,
    ) {
        let idx = (hash as usize) % self.size;

        let existing_key = self.keys[idx].load(Ordering::Relaxed);
        let existing_data = self.data[idx].load(Ordering::Relaxed);
        if (existing_key != 0 || existing_data != 0) && existing_key ^ existing_data != hash {
            let (existing_depth, _, _, _) = unpack_entry(existing_data);
            if depth < existing_depth {
                return;
            }
        }

        let packed = pack_entry(depth, score, entry_type, best_move);
        // Data first, then key: a concurrent reader sees either the
        // old pair or a mismatch.
        self.data[idx].store(packed, Ordering::Relaxed);
        self.keys[idx].store(hash ^ packed, Ordering::Relaxed);
    }

    /// Reset every slot.
    pub fn clear(&self) {
        for i in 0..self.size {
            self.keys[i].store(0, Ordering::Relaxed);
            self.data[i].store(0, Ordering::Relaxed);
        }
    }

    /// Occupancy statistics; approximate under concurrent writes.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        // Sample large tables instead of walking every slot.
        let step = if self.size > 65_536 { 64 } else { 1 };
        let mut used = 0usize;
        let mut sampled = 0usize;
        let mut i = 0;
        while i < self.size {
            sampled += 1;
            if self.keys[i].load(Ordering::Relaxed) != 0
                || self.data[i].load(Ordering::Relaxed) != 0
            {
                used += 1;
            }
            i += step;
        }
        let estimated = if step > 1 {
            used * self.size / sampled
        } else {
            used
        };
        TTStats {
            size: self.size,
            used: estimated,
            usage_percent: (estimated as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Transposition table occupancy.
#[derive(Debug, Clone, Copy)]
pub struct TTStats {
    pub size: usize,
    pub used: usize,
    pub usage_percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack_roundtrip() {
        let cases: Vec<(u8, i32, EntryType, Option<usize>)> = vec![
            (5, 100, EntryType::Exact, Some(180)),
            (3, -500_000, EntryType::LowerBound, None),
            (0, 0, EntryType::UpperBound, Some(0)),
            (64, 999_999, EntryType::Exact, Some(65_535)),
            (255, -1_048_575, EntryType::LowerBound, Some(1)),
            (1, 1_048_575, EntryType::UpperBound, None),
        ];
        for (depth, score, et, bm) in cases {
            let packed = pack_entry(depth, score, et, bm);
            let (d, s, t, m) = unpack_entry(packed);
            assert_eq!(d, depth, "depth mismatch for ({depth}, {score})");
            assert_eq!(s, score, "score mismatch for ({depth}, {score})");
            assert_eq!(t, et, "type mismatch for ({depth}, {score})");
            assert_eq!(m, bm, "move mismatch for ({depth}, {score})");
        }
    }

    #[test]
    fn test_store_probe_exact() {
        let tt = AtomicTT::new(1);
        let hash = 0x1234_5678_9ABC_DEF0;
        tt.store(hash, 5, 100, EntryType::Exact, Some(40));

        assert_eq!(tt.probe(hash, 5, -1000, 1000), Some(100));
        assert_eq!(tt.get_best_move(hash), Some(40));
    }

    #[test]
    fn test_probe_requires_matching_depth() {
        let tt = AtomicTT::new(1);
        let hash = 0x1234_5678_9ABC_DEF0;
        tt.store(hash, 3, 100, EntryType::Exact, Some(5));

        // A mismatched query cannot use the score but still gets the
        // move for ordering.
        assert_eq!(tt.probe(hash, 5, -1000, 1000), None);
        assert_eq!(tt.probe(hash, 3, -1000, 1000), Some(100));
        assert_eq!(tt.get_best_move(hash), Some(5));

        // A deeper entry does not answer a shallower query either.
        tt.store(hash, 5, 200, EntryType::Exact, Some(7));
        assert_eq!(tt.probe(hash, 3, -1000, 1000), None);
        assert_eq!(tt.probe(hash, 5, -1000, 1000), Some(200));
        assert_eq!(tt.get_best_move(hash), Some(7));
    }

    #[test]
    fn test_bound_entries() {
        let tt = AtomicTT::new(1);

        let hash_lb = 0x111;
        tt.store(hash_lb, 5, 200, EntryType::LowerBound, None);
        assert_eq!(tt.probe(hash_lb, 5, -1000, 150), Some(200));
        assert_eq!(tt.probe(hash_lb, 5, -1000, 300), None);

        let hash_ub = 0x222;
        tt.store(hash_ub, 5, 50, EntryType::UpperBound, None);
        assert_eq!(tt.probe(hash_ub, 5, 100, 1000), Some(50));
        assert_eq!(tt.probe(hash_ub, 5, 30, 1000), None);
    }

    #[test]
    fn test_hash_mismatch_is_miss() {
        let tt = AtomicTT::new(1);
        tt.store(0xAABB_CCDD_1122_3344, 5, 100, EntryType::Exact, Some(9));
        assert_eq!(tt.probe(0xFFEE_DDCC_4433_2211, 5, -1000, 1000), None);
        assert_eq!(tt.get_best_move(0xFFEE_DDCC_4433_2211), None);
    }

    #[test]
    fn test_replacement_policy() {
        let tt = AtomicTT::new(1);
        let hash = 0x1234_5678_9ABC_DEF0;

        tt.store(hash, 3, 100, EntryType::Exact, Some(5));
        tt.store(hash, 5, 200, EntryType::Exact, Some(9));
        assert_eq!(tt.probe(hash, 5, -1000, 1000), Some(200));
    }

    #[test]
    fn test_clear() {
        let tt = AtomicTT::new(1);
        let hash = 0x1234_5678_9ABC_DEF0;
        tt.store(hash, 5, 100, EntryType::Exact, None);
        tt.clear();
        assert_eq!(tt.probe(hash, 5, -1000, 1000), None);
        assert_eq!(tt.stats().used, 0);
    }

    #[test]
    fn test_stats() {
        let tt = AtomicTT::new(1);
        assert_eq!(tt.stats().used, 0);

        tt.store(0x111, 5, 100, EntryType::Exact, None);
        tt.store(0x222, 5, 100, EntryType::Exact, None);
        assert!(tt.stats().used >= 2);
    }

    #[test]
    fn test_concurrent_safety() {
        use std::sync::Arc;
        use std::thread;

        let tt = Arc::new(AtomicTT::new(1));
        let mut handles = Vec::new();
        for t in 0..4u64 {
            let tt = Arc::clone(&tt);
            handles.push(thread::spawn(move || {
                for i in 0..1000u64 {
                    let hash = t * 100_000 + i + 1;
                    tt.store(hash, 5, (i as i32) * 10, EntryType::Exact, Some(9));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(tt.stats().used > 0);
    }
}
