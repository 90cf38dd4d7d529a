//! `WordNode`/`WordGraph`: the bigram transition graph (spec.md §3).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use shared_files::ZenError;

use crate::loader::WordLoader;

/// A single vocabulary word's outgoing edges.
///
/// Invariant: `total == edges.values().sum()`; `edges` never holds a zero or
/// negative count (counts are unsigned and only ever incremented).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordNode {
    edges: IndexMap<char, u64>,
    total: u64,
}

impl WordNode {
    /// Outgoing edge weight to `word`, or `None` if there is no such edge.
    pub fn weight(&self, word: char) -> Option<u64> {
        self.edges.get(&word).copied()
    }

    /// Sum of all outgoing edge weights.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Iterates `(word, weight)` pairs in first-seen order (the order
    /// `add_edge` first introduced each destination), giving deterministic
    /// iteration for anything built on top of it (tree construction,
    /// weighted draws).
    pub fn edges(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.edges.iter().map(|(&w, &c)| (w, c))
    }

    fn bump(&mut self, word: char) {
        *self.edges.entry(word).or_insert(0) += 1;
        self.total += 1;
    }
}

/// The directed, weighted word-to-word transition graph (spec.md §3).
///
/// Invariant: `connections` equals the sum of every node's `total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordGraph {
    nodes: IndexMap<char, WordNode>,
    connections: u64,
}

impl WordGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of the bigram `(w1, w2)`: inserts either word
    /// as a node if absent, then increments `w1`'s edge to `w2`.
    pub fn add_edge(&mut self, w1: char, w2: char) {
        self.nodes.entry(w2).or_default();
        let node = self.nodes.entry(w1).or_default();
        node.bump(w2);
        self.connections += 1;
    }

    /// Number of distinct words (vocabulary size `V`).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total bigram occurrences recorded across the whole graph.
    pub fn connections(&self) -> u64 {
        self.connections
    }

    /// The node for `word`, if it appears anywhere in the corpus (as either
    /// side of a bigram).
    pub fn node(&self, word: char) -> Option<&WordNode> {
        self.nodes.get(&word)
    }

    /// All vocabulary words, in first-seen order.
    pub fn words(&self) -> impl Iterator<Item = char> + '_ {
        self.nodes.keys().copied()
    }

    /// Builds a graph by reading the given files through a [`WordLoader`]
    /// and adding an edge for every consecutive pair of Han code points,
    /// including across file boundaries (spec.md §4.2: "partial lines and
    /// cross-file boundaries do not reset pairing").
    ///
    /// # Errors
    ///
    /// Returns [`ZenError::CorpusEmpty`] if the corpus yields fewer than two
    /// Han code points (not enough to form a single bigram).
    pub fn from_corpus<I, P>(paths: I) -> Result<WordGraph, ZenError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<std::path::Path>,
    {
        let mut loader = WordLoader::new(paths);
        let mut graph = WordGraph::new();

        let Some(mut prev) = loader.next() else {
            return Err(ZenError::CorpusEmpty);
        };
        graph.nodes.entry(prev).or_default();

        for next in loader {
            graph.add_edge(prev, next);
            prev = next;
        }

        Ok(graph)
    }
}
