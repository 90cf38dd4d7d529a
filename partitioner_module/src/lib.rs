//! `Partitioner`: the K-Huffman-tree ensemble plus the word graph, and the
//! `encode`/`decode` orchestration built on top of them (spec.md §3, §4.4).

use bitstream_module::BitStream;
use huffman_module::HuffmanTree;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared_files::config::MIN_LEAVES_PER_TREE;
use shared_files::ZenError;
use wordgraph_module::WordGraph;

/// An ordered array of `K` Huffman trees over disjoint blocks of a
/// `WordGraph`'s vocabulary, plus the graph itself. Immutable after
/// construction and safe to share across concurrent encode/decode calls
/// given each call owns its own `BitStream` (spec.md §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partitioner {
    trees: Vec<HuffmanTree>,
    graph: WordGraph,
}

impl Partitioner {
    /// Builds a partitioner with `tree_count` Huffman trees from `graph`.
    ///
    /// Per spec.md §3: `per_tree = V / (tree_count + 1) - 1`. The vocabulary
    /// is shuffled, the first `tree_count * per_tree` words become `
    /// tree_count` contiguous blocks (one Huffman tree each, weighted by
    /// each word's `total` outgoing-edge count), and the next `per_tree - 1`
    /// words become the tail reserve decorated onto tree 0 via
    /// `fill_tail_code`. Anything beyond that stays in the graph purely as
    /// bigram context.
    ///
    /// # Errors
    ///
    /// Returns [`ZenError::VocabularyTooSmall`] if
    /// `V / (tree_count + 1) - 1 < 2`.
    pub fn build<R: Rng + ?Sized>(
        graph: WordGraph,
        tree_count: usize,
        rng: &mut R,
    ) -> Result<Partitioner, ZenError> {
        let vocabulary_size = graph.len();
        let per_tree = vocabulary_size
            .checked_div(tree_count + 1)
            .and_then(|base| base.checked_sub(1));

        let per_tree = match per_tree {
            Some(n) if n >= MIN_LEAVES_PER_TREE => n,
            _ => {
                return Err(ZenError::VocabularyTooSmall {
                    vocabulary_size,
                    tree_count,
                    per_tree: per_tree.unwrap_or(0),
                    min_required: MIN_LEAVES_PER_TREE,
                });
            }
        };

        let mut shuffled: Vec<char> = graph.words().collect();
        shuffled.shuffle(rng);

        let mut trees = Vec::with_capacity(tree_count);
        let mut cursor = 0usize;
        for _ in 0..tree_count {
            let block = &shuffled[cursor..cursor + per_tree];
            cursor += per_tree;

            let mut freqs = indexmap::IndexMap::with_capacity(block.len());
            for &word in block {
                let total = graph.node(word).map(|n| n.total()).unwrap_or(0).max(1);
                freqs.insert(word, total);
            }
            trees.push(HuffmanTree::build(&freqs).expect("block is non-empty"));
        }

        let tail_reserve: Vec<char> = shuffled[cursor..cursor + (per_tree - 1)].to_vec();
        trees[0].fill_tail_code(&tail_reserve);

        log::debug!(
            "built partitioner: vocabulary={vocabulary_size}, tree_count={tree_count}, \
             per_tree={per_tree}, tail_reserve={}",
            tail_reserve.len()
        );

        Ok(Partitioner { trees, graph })
    }

    /// Number of Huffman trees (`K`).
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Consumes bits from `stream`, emitting a sequence of words (spec.md
    /// §4.4). Each round asks every tree for a candidate word via a
    /// non-destructive `cut_word`, weights each candidate by the previous
    /// word's bigram edge weight to it (or `1` for the very first word, or
    /// if the graph has no such edge), and draws one candidate uniformly by
    /// weight. When no tree can produce a (non-tail) candidate (because
    /// every remaining code is longer than what's left in `stream`), tree 0
    /// is asked for a tail-code word instead, which always succeeds and
    /// terminates the loop.
    pub fn encode<R: Rng + ?Sized>(&self, stream: &mut BitStream, rng: &mut R) -> Vec<char> {
        let mut current: Option<char> = None;
        let mut out = Vec::new();

        loop {
            let mut candidates: Vec<(char, BitStream, u64)> = Vec::new();
            for tree in &self.trees {
                let Some(word) = tree.cut_word(stream, false) else {
                    continue;
                };
                let code = tree
                    .get_string_bit_stream(word)
                    .expect("cut_word only returns words this tree recognizes");
                let weight = match current {
                    None => 1,
                    Some(prev) => self
                        .graph
                        .node(prev)
                        .and_then(|n| n.weight(word))
                        .unwrap_or(1),
                };
                candidates.push((word, code, weight));
            }

            if candidates.is_empty() {
                let tail_word = self.trees[0]
                    .cut_word(stream, true)
                    .expect("tail reserve guarantees termination on any remaining suffix");
                out.push(tail_word);
                return out;
            }

            let total_weight: u64 = candidates.iter().map(|(_, _, w)| w).sum();
            let draw = rng.random_range(0..total_weight);
            let mut acc = 0u64;
            let chosen = candidates
                .into_iter()
                .find(|(_, _, weight)| {
                    acc += weight;
                    acc > draw
                })
                .expect("draw is < total_weight, so some candidate's cumulative weight exceeds it");

            let (word, mut code, _) = chosen;
            current = Some(word);
            out.push(word);
            stream.cut(&mut code);
        }
    }

    /// Recovers the bit stream encoded by `words`: for each word, finds the
    /// first tree that recognizes it (as a leaf or a tail-coded internal
    /// node) and appends that word's bit path. Returns `None` as soon as a
    /// word isn't recognized by any tree (spec.md §4.4, §7
    /// `DecodeUnknownWord`).
    pub fn decode(&self, words: &[char]) -> Option<BitStream> {
        let mut result = BitStream::new();
        for &word in words {
            let mut code = self
                .trees
                .iter()
                .find_map(|tree| tree.get_string_bit_stream(word))?;
            result.append(&mut code);
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn sample_graph() -> WordGraph {
        let corpus: Vec<char> = "的一是在不了有和人这的一是在不了有和人这的一是在不了有和人这"
            .chars()
            .collect();
        let mut graph = WordGraph::new();
        for pair in corpus.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        graph
    }

    #[test]
    fn s1_construction_and_single_byte_round_trip() {
        let graph = sample_graph();
        let mut rng = SmallRng::seed_from_u64(1);
        let partitioner = Partitioner::build(graph, 2, &mut rng).unwrap();

        let mut stream = BitStream::from_bytes(&[0x00]);
        let words = partitioner.encode(&mut stream, &mut rng);
        assert!(!words.is_empty());

        let mut decoded = partitioner.decode(&words).unwrap();
        assert_eq!(decoded.to_bytes(), vec![0x00]);
    }

    #[test]
    fn s2_round_trip_assorted_payloads() {
        let graph = sample_graph();
        let mut rng = SmallRng::seed_from_u64(7);
        let partitioner = Partitioner::build(graph, 2, &mut rng).unwrap();

        let payloads: &[&[u8]] = &[&[], &[0xFF], &[0xAA, 0x55]];
        for payload in payloads {
            let mut stream = BitStream::from_bytes(payload);
            let words = partitioner.encode(&mut stream, &mut rng);
            let mut decoded = partitioner.decode(&words).unwrap();
            assert_eq!(&decoded.to_bytes(), payload);
        }
    }

    #[test]
    fn s6_unknown_word_rejected() {
        let graph = sample_graph();
        let mut rng = SmallRng::seed_from_u64(2);
        let partitioner = Partitioner::build(graph, 2, &mut rng).unwrap();
        assert!(partitioner.decode(&['的', '龘']).is_none());
    }

    #[test]
    fn vocabulary_too_small_is_rejected() {
        let mut graph = WordGraph::new();
        graph.add_edge('a', 'b');
        graph.add_edge('b', 'a');
        let mut rng = SmallRng::seed_from_u64(3);
        let err = Partitioner::build(graph, 12, &mut rng).unwrap_err();
        assert!(matches!(err, ZenError::VocabularyTooSmall { .. }));
    }

    #[test]
    fn partition_disjointness() {
        let graph = sample_graph();
        let mut rng = SmallRng::seed_from_u64(4);
        let partitioner = Partitioner::build(graph, 2, &mut rng).unwrap();

        for &w in &['的', '一', '是', '在', '不', '了', '有', '和', '人', '这'] {
            let hits = partitioner
                .trees
                .iter()
                .filter(|t| t.get_string_bit_stream(w).is_some())
                .count();
            assert!(hits <= 1, "word {w:?} must not be codeable in more than one tree");
        }
    }
}
