//! Per-dictionary Huffman tree (spec.md §3, §4.3).
//!
//! The teacher's canonical byte-oriented Huffman compressor built an owned
//! `Box<Node>` tree and a separate canonical-code table. Here the tree is a
//! `char`-keyed arena (nodes stored in a `Vec` addressed by index, per the
//! spec's own design note in §9 favoring an arena-with-indices layout over
//! self-referential boxes (this is also what lets the whole tree derive
//! `Serialize`/`Deserialize` for opaque persistence), and it additionally
//! supports tail-code decoration of internal nodes so the encoder can
//! terminate on any bit suffix (spec.md §4.3, §4.4).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use bitstream_module::BitStream;

/// Errors raised while building or decorating a [`HuffmanTree`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HuffmanError {
    /// `build` was given an empty `word -> frequency` map.
    #[error("cannot build a Huffman tree from an empty frequency map")]
    EmptyDictionary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum NodeData {
    Leaf(char),
    Internal { left: usize, right: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HuffNode {
    freq: u64,
    parent: Option<usize>,
    data: NodeData,
    /// Set by `fill_tail_code` for internal nodes chosen as tail-code words.
    tail_word: Option<char>,
}

impl HuffNode {
    fn is_internal(&self) -> bool {
        matches!(self.data, NodeData::Internal { .. })
    }
}

/// A binary Huffman tree over one dictionary's `word -> frequency` map, with
/// an arena layout (`nodes[root]` is the root) so the whole tree, including
/// tail-code assignments made after the initial build, round-trips through
/// `serde` as plain data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuffmanTree {
    nodes: Vec<HuffNode>,
    root: usize,
    /// word -> node index, covering every leaf, and (once `full_code` is
    /// true) every tail-coded internal node too.
    reverse_index: IndexMap<char, usize>,
    /// False until `fill_tail_code` has been called.
    full_code: bool,
}

/// A heap entry ordered by `(freq, insertion sequence)` ascending, so that
/// frequency ties always resolve the same way for the same input, required
/// for `save`/`load` and cross-process encoding to agree on tree shape
/// (spec.md §9 "Priority queue determinism").
struct HeapEntry {
    freq: u64,
    seq: u64,
    idx: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.freq, self.seq).cmp(&(other.freq, other.seq))
    }
}

impl HuffmanTree {
    /// Builds a tree from a `word -> frequency` dictionary.
    ///
    /// Every dictionary word ends up at exactly one leaf; the two
    /// lowest-frequency nodes are repeatedly combined (first-extracted as
    /// left child, second-extracted as right child) until one root remains.
    /// If the dictionary has a single word, that word's leaf *is* the root,
    /// and its code is the empty bit sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use huffman_module::HuffmanTree;
    /// use indexmap::IndexMap;
    ///
    /// let mut freqs = IndexMap::new();
    /// freqs.insert('a', 1u64);
    /// freqs.insert('b', 1u64);
    /// freqs.insert('c', 2u64);
    /// let tree = HuffmanTree::build(&freqs).unwrap();
    /// assert_eq!(tree.get_string_bit_stream('c').unwrap().size(), 1);
    /// assert_eq!(tree.get_string_bit_stream('a').unwrap().size(), 2);
    /// ```
    pub fn build(freqs: &IndexMap<char, u64>) -> Result<Self, HuffmanError> {
        if freqs.is_empty() {
            return Err(HuffmanError::EmptyDictionary);
        }

        let mut nodes = Vec::with_capacity(freqs.len() * 2);
        let mut reverse_index = IndexMap::with_capacity(freqs.len());
        let mut heap = BinaryHeap::with_capacity(freqs.len());
        let mut seq = 0u64;

        for (&word, &freq) in freqs {
            let idx = nodes.len();
            nodes.push(HuffNode {
                freq,
                parent: None,
                data: NodeData::Leaf(word),
                tail_word: None,
            });
            reverse_index.insert(word, idx);
            heap.push(Reverse(HeapEntry { freq, seq, idx }));
            seq += 1;
        }

        while heap.len() > 1 {
            let Reverse(left) = heap.pop().expect("len > 1");
            let Reverse(right) = heap.pop().expect("len > 1");
            let new_idx = nodes.len();
            let freq = left.freq + right.freq;
            nodes.push(HuffNode {
                freq,
                parent: None,
                data: NodeData::Internal {
                    left: left.idx,
                    right: right.idx,
                },
                tail_word: None,
            });
            nodes[left.idx].parent = Some(new_idx);
            nodes[right.idx].parent = Some(new_idx);
            heap.push(Reverse(HeapEntry {
                freq,
                seq,
                idx: new_idx,
            }));
            seq += 1;
        }

        let root = heap.pop().expect("dictionary is non-empty").0.idx;

        Ok(HuffmanTree {
            nodes,
            root,
            reverse_index,
            full_code: false,
        })
    }

    /// Number of internal (two-child) nodes in the tree: the minimum
    /// length `fill_tail_code` needs its `words` slice to be.
    pub fn internal_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_internal()).count()
    }

    /// True once [`fill_tail_code`](Self::fill_tail_code) has run.
    pub fn is_full_code(&self) -> bool {
        self.full_code
    }

    /// Assigns a word from `words` to every internal node, via a DFS from
    /// the root using a LIFO stack seeded with the root. At each pop: if the
    /// node has two children, it's assigned `words[i]` (`i` then advances),
    /// after which the left child is pushed, then the right child, so the
    /// right subtree is visited before the left. This traversal order is
    /// part of the on-disk contract (spec.md §4.3, §9): it must not be
    /// reordered even though the resulting assignment would still be a
    /// valid tail-code in some other order.
    ///
    /// `words` may be longer than `internal_node_count()`; extras are
    /// unused. If it's shorter, the remaining internal nodes simply receive
    /// no tail word (calling this with too few words still completes, it
    /// just leaves some internal nodes unreachable as tail words).
    pub fn fill_tail_code(&mut self, words: &[char]) {
        let mut stack = vec![self.root];
        let mut i = 0usize;

        while let Some(idx) = stack.pop() {
            let (left, right) = match self.nodes[idx].data {
                NodeData::Internal { left, right } => (left, right),
                NodeData::Leaf(_) => continue,
            };

            if i < words.len() {
                let word = words[i];
                i += 1;
                self.nodes[idx].tail_word = Some(word);
                self.reverse_index.insert(word, idx);
            }

            stack.push(left);
            stack.push(right);
        }

        self.full_code = true;
    }

    /// The root-to-leaf (or root-to-tail-coded-internal-node) bit path for
    /// `word`, or `None` if `word` isn't in this tree.
    pub fn get_string_bit_stream(&self, word: char) -> Option<BitStream> {
        let mut idx = *self.reverse_index.get(&word)?;
        let mut bits = Vec::new();

        while let Some(parent) = self.nodes[idx].parent {
            let went_right = match self.nodes[parent].data {
                NodeData::Internal { left, right } => {
                    if idx == left {
                        false
                    } else {
                        debug_assert_eq!(idx, right);
                        true
                    }
                }
                NodeData::Leaf(_) => unreachable!("parent is always internal"),
            };
            bits.push(went_right);
            idx = parent;
        }

        bits.reverse();
        Some(bits.into_iter().collect())
    }

    /// Speculative lookup: walks the tree by peeking (not destructively
    /// popping) bits off the front of `stream`, and restores every bit it
    /// inspected before returning. Callers consume the stream themselves,
    /// via `BitStream::cut` against the returned word's own code (spec.md
    /// §4.3). The only case where a word is returned *and* bits are not all
    /// restorable as "unconsumed" is the tail-code termination case, which
    /// is intentionally asymmetric: it returns a word that is only a
    /// *prefix* of the bits inspected, precisely so the caller's `cut` can
    /// consume exactly that prefix.
    pub fn cut_word(&self, stream: &mut BitStream, tail_code: bool) -> Option<char> {
        let mut idx = self.root;
        let mut popped = Vec::new();

        loop {
            let (left, right) = match self.nodes[idx].data {
                NodeData::Internal { left, right } => (left, right),
                NodeData::Leaf(word) => {
                    Self::restore(stream, &mut popped);
                    return Some(word);
                }
            };

            if stream.is_empty() {
                let tail_word = self.nodes[idx].tail_word;
                Self::restore(stream, &mut popped);
                return if tail_code && self.full_code {
                    tail_word
                } else {
                    None
                };
            }

            let bit = stream.pop().expect("checked non-empty above");
            popped.push(bit);
            idx = if bit { right } else { left };
        }
    }

    fn restore(stream: &mut BitStream, popped: &mut Vec<bool>) {
        while let Some(bit) = popped.pop() {
            stream.recover(bit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn freqs(pairs: &[(char, u64)]) -> IndexMap<char, u64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn s5_prefix_free_and_speculative() {
        let tree = HuffmanTree::build(&freqs(&[('a', 1), ('b', 1), ('c', 2)])).unwrap();

        let code_a = tree.get_string_bit_stream('a').unwrap();
        let code_b = tree.get_string_bit_stream('b').unwrap();
        let code_c = tree.get_string_bit_stream('c').unwrap();
        assert_eq!(code_c.size(), 1);
        assert_eq!(code_a.size(), 2);
        assert_eq!(code_b.size(), 2);

        let mut stream = code_a.clone();
        let before = stream.clone();
        let word = tree.cut_word(&mut stream, false);
        assert_eq!(word, Some('a'));
        assert_eq!(stream, before, "speculative lookup must not consume bits");
    }

    #[test]
    fn single_word_dictionary_root_is_leaf_with_empty_code() {
        let tree = HuffmanTree::build(&freqs(&[('的', 5)])).unwrap();
        let code = tree.get_string_bit_stream('的').unwrap();
        assert_eq!(code.size(), 0);
    }

    #[test]
    fn unknown_word_lookup_returns_none() {
        let tree = HuffmanTree::build(&freqs(&[('a', 1), ('b', 2)])).unwrap();
        assert!(tree.get_string_bit_stream('z').is_none());
    }

    #[test]
    fn tail_code_terminates_on_short_suffix() {
        let mut tree =
            HuffmanTree::build(&freqs(&[('a', 1), ('b', 1), ('c', 2), ('d', 4)])).unwrap();
        let internal_count = tree.internal_node_count();
        assert!(internal_count >= 1);
        tree.fill_tail_code(&['春', '夏', '秋']);
        assert!(tree.is_full_code());

        // An empty stream should hit a tail-code word at the root, not None.
        let mut empty = BitStream::new();
        let word = tree.cut_word(&mut empty, true);
        assert!(word.is_some());
        // Without tail_code requested, the same situation yields None.
        let mut empty2 = BitStream::new();
        assert_eq!(tree.cut_word(&mut empty2, false), None);
    }

    #[test]
    fn empty_dictionary_is_rejected() {
        assert_eq!(
            HuffmanTree::build(&IndexMap::new()).unwrap_err(),
            HuffmanError::EmptyDictionary
        );
    }

    #[test]
    fn decode_follows_encode_path_round_trip() {
        let tree = HuffmanTree::build(&freqs(&[('a', 5), ('b', 3), ('c', 2), ('d', 1)])).unwrap();
        for &w in &['a', 'b', 'c', 'd'] {
            let mut code = tree.get_string_bit_stream(w).unwrap();
            let decoded = tree.cut_word(&mut code, false);
            assert_eq!(decoded, Some(w));
        }
    }

    proptest! {
        #[test]
        fn tree_round_trips_every_leaf(
            freqs in proptest::collection::btree_map(
                proptest::char::range('\u{4e00}', '\u{4e40}'),
                1u64..100,
                1..32,
            )
        ) {
            let map: IndexMap<char, u64> = freqs.into_iter().collect();
            let words: Vec<char> = map.keys().copied().collect();
            let tree = HuffmanTree::build(&map).unwrap();

            for &word in &words {
                let mut code = tree.get_string_bit_stream(word).unwrap();
                let before = code.clone();
                prop_assert_eq!(tree.cut_word(&mut code, false), Some(word));
                prop_assert_eq!(code, before, "speculative lookup must not consume bits");
            }
        }

        #[test]
        fn no_leaf_code_is_a_prefix_of_another(
            freqs in proptest::collection::btree_map(
                proptest::char::range('\u{4e00}', '\u{4e40}'),
                1u64..100,
                2..32,
            )
        ) {
            let map: IndexMap<char, u64> = freqs.into_iter().collect();
            let tree = HuffmanTree::build(&map).unwrap();
            let codes: Vec<Vec<bool>> = map
                .keys()
                .map(|&w| tree.get_string_bit_stream(w).unwrap().iter().collect())
                .collect();

            for i in 0..codes.len() {
                for j in 0..codes.len() {
                    if i == j {
                        continue;
                    }
                    let shorter_is_prefix = codes[i].len() <= codes[j].len()
                        && codes[i] == codes[j][..codes[i].len()];
                    prop_assert!(!shorter_is_prefix, "leaf codes must be prefix-free");
                }
            }
        }
    }
}
