//! `Succinct` — the compressed, read-only phase: two rank-indexed
//! bitmaps plus a key-character array and a record array, built from a
//! breadth-first traversal of a [`TernaryTrie`].
//!
//! Ported from `s_index_succinct.c`: the `child = 3 * rank1(nodes, slot)`
//! navigation formula, the root-sentinel-at-bit-1 / real-root-at-handle-3
//! layout, and the `next`/`prev` "remember the last viable turn, replay
//! `min`/`max` from it" state machine (`up`/`hold`/`flag`) are preserved
//! exactly — this algorithm is intricate enough that re-deriving its
//! control flow from scratch would be a correctness risk.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::bitmap::BitmapRank;
use crate::error::IndexError;
use crate::trie::TernaryTrie;

/// The compressed, read-only structure.
///
/// `keys`/`valids_bitmap` are indexed by trie-node index `i` in
/// `[0, size)` (index 0 is the unused sentinel slot); `records` is
/// indexed by valid-rank in `[0, items)` (index 0 likewise unused).
/// `nodes_bitmap` packs three bits per node (left/center/right presence)
/// so it is addressed by "handle" = `3 * node_index`.
pub struct Succinct {
    keys: Vec<u8>,
    records: Vec<u64>,
    nodes_bitmap: Option<BitmapRank>,
    valids_bitmap: Option<BitmapRank>,
    items: u64,
}

impl Succinct {
    /// Encode `trie` into its succinct representation.
    pub fn new(trie: &TernaryTrie) -> Result<Self, IndexError> {
        if trie.items() == 0 {
            return Ok(Self {
                keys: Vec::new(),
                records: Vec::new(),
                nodes_bitmap: None,
                valids_bitmap: None,
                items: 0,
            });
        }

        let size = trie.nodes() + 1;
        let items = trie.items() + 1;

        let mut nodes_bitmap = BitmapRank::new((size * 3) as usize)?;
        let mut valids_bitmap = BitmapRank::new(size as usize)?;

        let mut keys = Vec::new();
        keys.try_reserve_exact(size as usize)
            .map_err(|_| IndexError::OutOfMemory)?;
        keys.resize(size as usize, 0u8);

        let mut records = Vec::new();
        records
            .try_reserve_exact(items as usize)
            .map_err(|_| IndexError::OutOfMemory)?;
        records.resize(items as usize, 0u64);

        // Index 1 is the virtual root; its "has center" bit points at the
        // real root, written at slot 1 below.
        nodes_bitmap.set(1);

        let mut write_size: u64 = 1;
        let mut write_items: u64 = 1;
        trie.iterate(|ch, has_left, has_center, has_right, record| {
            let base = (write_size * 3) as usize;
            if has_left {
                nodes_bitmap.set(base);
            }
            if has_center {
                nodes_bitmap.set(base + 1);
            }
            if has_right {
                nodes_bitmap.set(base + 2);
            }
            if let Some(r) = record {
                valids_bitmap.set(write_size as usize);
                records[write_items as usize] = r;
                write_items += 1;
            }
            keys[write_size as usize] = ch;
            write_size += 1;
        })?;

        nodes_bitmap.prepare();
        valids_bitmap.prepare();

        debug_assert_eq!(size, write_size);
        debug_assert_eq!(items, write_items);

        Ok(Self {
            keys,
            records,
            nodes_bitmap: Some(nodes_bitmap),
            valids_bitmap: Some(valids_bitmap),
            items,
        })
    }

    #[inline]
    fn child(&self, bit: usize) -> u64 {
        let nodes = self
            .nodes_bitmap
            .as_ref()
            .expect("nodes_bitmap present whenever items > 0");
        if nodes.get(bit) {
            3 * nodes.rank1(bit) as u64
        } else {
            0
        }
    }

    #[inline]
    fn is_valid(&self, node_index: usize) -> bool {
        self.valids_bitmap
            .as_ref()
            .is_some_and(|v| v.get(node_index))
    }

    #[inline]
    fn record_rank(&self, node_index: usize) -> u64 {
        self.valids_bitmap.as_ref().expect("checked valid").rank1(node_index) as u64
    }

    /// Descend as far left as possible, collecting the characters of the
    /// smallest key reachable from `handle`, and return its record rank
    /// (0 if none is reachable).
    fn min_from(&self, mut handle: u64, out: &mut Vec<u8>) -> u64 {
        loop {
            if handle == 0 {
                return 0;
            }
            let left = self.child(handle as usize);
            if left == 0 {
                let node_index = (handle / 3) as usize;
                out.push(self.keys[node_index]);
                if self.is_valid(node_index) {
                    return self.record_rank(node_index);
                }
                handle = self.child(handle as usize + 1);
            } else {
                handle = left;
            }
        }
    }

    /// Symmetric to [`Self::min_from`], descending right.
    fn max_from(&self, mut handle: u64, out: &mut Vec<u8>) -> u64 {
        loop {
            if handle == 0 {
                return 0;
            }
            let right = self.child(handle as usize + 2);
            if right == 0 {
                let node_index = (handle / 3) as usize;
                out.push(self.keys[node_index]);
                if self.is_valid(node_index) {
                    return self.record_rank(node_index);
                }
                handle = self.child(handle as usize + 1);
            } else {
                handle = right;
            }
        }
    }

    fn find_rank(&self, key: &[u8]) -> u64 {
        let mut handle: u64 = 3;
        let mut idx = 0usize;
        loop {
            if handle == 0 {
                return 0;
            }
            let node_index = (handle / 3) as usize;
            let d = key[idx] as i32 - self.keys[node_index] as i32;
            if d == 0 {
                idx += 1;
                if idx == key.len() {
                    return if self.is_valid(node_index) {
                        self.record_rank(node_index)
                    } else {
                        0
                    };
                }
                handle = self.child(handle as usize + 1);
            } else if d < 0 {
                handle = self.child(handle as usize);
            } else {
                handle = self.child(handle as usize + 2);
            }
        }
    }

    fn next_rank(&self, key: &[u8], out: &mut Vec<u8>) -> u64 {
        let mut up: u64 = 0;
        let mut hold = 0usize;
        let mut flag = false;
        let mut handle: u64 = 3;
        let mut idx = 0usize;

        loop {
            if handle == 0 {
                break;
            }
            let node_index = (handle / 3) as usize;
            let d = key[idx] as i32 - self.keys[node_index] as i32;
            if d < 0 {
                let center = self.child(handle as usize + 1);
                if self.is_valid(node_index) || center != 0 {
                    up = handle;
                    hold = out.len();
                    flag = true;
                } else {
                    let right = self.child(handle as usize + 2);
                    if right != 0 {
                        up = right;
                        hold = out.len();
                        flag = false;
                    }
                }
                handle = self.child(handle as usize);
            } else if d == 0 {
                let right = self.child(handle as usize + 2);
                if right != 0 {
                    up = right;
                    hold = out.len();
                    flag = false;
                }
                handle = self.child(handle as usize + 1);
                out.push(key[idx]);
                idx += 1;
                if idx == key.len() {
                    break;
                }
            } else {
                handle = self.child(handle as usize + 2);
            }
        }

        if handle != 0 {
            return self.min_from(handle, out);
        }
        if up == 0 {
            return 0;
        }
        out.truncate(hold);
        if flag {
            let node_index = (up / 3) as usize;
            if self.is_valid(node_index) {
                out.push(self.keys[node_index]);
                return self.record_rank(node_index);
            }
            let center = self.child(up as usize + 1);
            if center != 0 {
                out.push(self.keys[node_index]);
                return self.min_from(center, out);
            }
            let right = self.child(up as usize + 2);
            if right != 0 {
                return self.min_from(right, out);
            }
            0
        } else {
            self.min_from(up, out)
        }
    }

    fn prev_rank(&self, key: &[u8], out: &mut Vec<u8>) -> u64 {
        let mut up: u64 = 0;
        let mut hold = 0usize;
        let mut flag = false;
        let mut handle: u64 = 3;
        let mut idx = 0usize;

        loop {
            if handle == 0 {
                break;
            }
            let node_index = (handle / 3) as usize;
            let d = key[idx] as i32 - self.keys[node_index] as i32;
            if d > 0 {
                let center = self.child(handle as usize + 1);
                if self.is_valid(node_index) || center != 0 {
                    up = handle;
                    hold = out.len();
                    flag = true;
                } else {
                    let left = self.child(handle as usize);
                    if left != 0 {
                        up = left;
                        hold = out.len();
                        flag = false;
                    }
                }
                handle = self.child(handle as usize + 2);
            } else if d == 0 {
                let left = self.child(handle as usize);
                if left != 0 {
                    up = left;
                    hold = out.len();
                    flag = false;
                }
                handle = self.child(handle as usize + 1);
                out.push(key[idx]);
                idx += 1;
                if idx == key.len() {
                    break;
                }
            } else {
                handle = self.child(handle as usize);
            }
        }

        if handle != 0 {
            return self.max_from(handle, out);
        }
        if up == 0 {
            return 0;
        }
        out.truncate(hold);
        if flag {
            let node_index = (up / 3) as usize;
            if self.is_valid(node_index) {
                out.push(self.keys[node_index]);
                return self.record_rank(node_index);
            }
            let center = self.child(up as usize + 1);
            if center != 0 {
                out.push(self.keys[node_index]);
                return self.max_from(center, out);
            }
            let left = self.child(up as usize);
            if left != 0 {
                return self.max_from(left, out);
            }
            0
        } else {
            self.max_from(up, out)
        }
    }

    /// Exact lookup.
    pub fn find(&mut self, key: &[u8]) -> Option<&mut u64> {
        if self.items == 0 {
            return None;
        }
        let rank = self.find_rank(key);
        if rank == 0 {
            None
        } else {
            Some(&mut self.records[rank as usize])
        }
    }

    /// Lexicographic successor of `key` (or the minimum key if `key` is
    /// `None`/empty). `key` need not exist in the index.
    pub fn next(&mut self, key: Option<&[u8]>, out_key: &mut Vec<u8>) -> Option<&mut u64> {
        out_key.clear();
        if self.items == 0 {
            return None;
        }
        let rank = match key {
            Some(k) if !k.is_empty() => self.next_rank(k, out_key),
            _ => self.min_from(3, out_key),
        };
        if rank == 0 {
            None
        } else {
            Some(&mut self.records[rank as usize])
        }
    }

    /// Lexicographic predecessor of `key` (or the maximum key if `key` is
    /// `None`/empty). `key` need not exist in the index.
    pub fn prev(&mut self, key: Option<&[u8]>, out_key: &mut Vec<u8>) -> Option<&mut u64> {
        out_key.clear();
        if self.items == 0 {
            return None;
        }
        let rank = match key {
            Some(k) if !k.is_empty() => self.prev_rank(k, out_key),
            _ => self.max_from(3, out_key),
        };
        if rank == 0 {
            None
        } else {
            Some(&mut self.records[rank as usize])
        }
    }

    /// Count of stored keys.
    pub fn items(&self) -> u64 {
        self.items.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ArenaTree;

    fn build(pairs: &[(&str, u64)]) -> Succinct {
        let mut tree = ArenaTree::new();
        for (k, v) in pairs {
            *tree.update(k.as_bytes()).unwrap() = *v;
        }
        let trie = TernaryTrie::new(&tree).unwrap();
        Succinct::new(&trie).unwrap()
    }

    #[test]
    fn empty_succinct() {
        let mut s = build(&[]);
        assert_eq!(s.items(), 0);
        assert!(s.find(b"K").is_none());
        let mut out = Vec::new();
        assert!(s.next(None, &mut out).is_none());
        assert!(s.prev(None, &mut out).is_none());
    }

    #[test]
    fn single_item_roundtrip() {
        let mut s = build(&[("B", 123)]);
        assert_eq!(s.items(), 1);
        assert!(s.find(b"A").is_none());
        assert_eq!(*s.find(b"B").unwrap(), 123);

        let mut out = Vec::new();
        assert_eq!(*s.next(None, &mut out).unwrap(), 123);
        assert_eq!(out, b"B");
        assert_eq!(*s.prev(None, &mut out).unwrap(), 123);
        assert_eq!(out, b"B");
        assert_eq!(*s.next(Some(b"A"), &mut out).unwrap(), 123);
        assert_eq!(*s.prev(Some(b"C"), &mut out).unwrap(), 123);
        assert!(s.next(Some(b"B"), &mut out).is_none());
        assert!(s.prev(Some(b"A"), &mut out).is_none());
    }

    #[test]
    fn two_item_neighborhood() {
        let mut s = build(&[("A", 123), ("C", 321)]);
        let mut out = Vec::new();
        assert_eq!(*s.next(None, &mut out).unwrap(), 123);
        assert_eq!(*s.prev(None, &mut out).unwrap(), 321);
        assert_eq!(*s.next(Some(b"B"), &mut out).unwrap(), 321);
        assert_eq!(*s.prev(Some(b"B"), &mut out).unwrap(), 123);
        assert!(s.find(b"B").is_none());
    }

    #[test]
    fn neighborhood_on_missing_probe() {
        let mut s = build(&[("b", 1), ("d", 2), ("f", 3)]);
        let mut out = Vec::new();
        assert_eq!(s.next(Some(b"a"), &mut out).map(|_| out.clone()), Some(b"b".to_vec()));
        assert_eq!(s.next(Some(b"c"), &mut out).map(|_| out.clone()), Some(b"d".to_vec()));
        assert_eq!(s.next(Some(b"e"), &mut out).map(|_| out.clone()), Some(b"f".to_vec()));
        assert!(s.next(Some(b"g"), &mut out).is_none());
        assert!(s.prev(Some(b"a"), &mut out).is_none());
        assert_eq!(s.prev(Some(b"c"), &mut out).map(|_| out.clone()), Some(b"b".to_vec()));
        assert_eq!(s.prev(Some(b"e"), &mut out).map(|_| out.clone()), Some(b"d".to_vec()));
        assert_eq!(s.prev(Some(b"g"), &mut out).map(|_| out.clone()), Some(b"f".to_vec()));
    }

    #[test]
    fn sorted_traversal_matches_insertion_set() {
        let pairs: Vec<(&str, u64)> = vec![("m", 1), ("a", 2), ("z", 3), ("c", 4), ("q", 5)];
        let mut s = build(&pairs);
        let mut out = Vec::new();
        let mut cursor: Option<Vec<u8>> = None;
        let mut seen = Vec::new();
        loop {
            let found = s.next(cursor.as_deref(), &mut out).is_some();
            if !found {
                break;
            }
            seen.push(out.clone());
            cursor = Some(out.clone());
        }
        assert_eq!(seen, vec![b"a".to_vec(), b"c".to_vec(), b"m".to_vec(), b"q".to_vec(), b"z".to_vec()]);
    }

    #[test]
    fn reverse_traversal() {
        let pairs: Vec<(&str, u64)> = vec![("m", 1), ("a", 2), ("z", 3), ("c", 4)];
        let mut s = build(&pairs);
        let mut out = Vec::new();
        let mut cursor: Option<Vec<u8>> = None;
        let mut seen = Vec::new();
        loop {
            let found = s.prev(cursor.as_deref(), &mut out).is_some();
            if !found {
                break;
            }
            seen.push(out.clone());
            cursor = Some(out.clone());
        }
        assert_eq!(seen, vec![b"z".to_vec(), b"m".to_vec(), b"c".to_vec(), b"a".to_vec()]);
    }
}
