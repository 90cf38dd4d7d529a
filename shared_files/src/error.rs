//! Shared error type for the cross-cutting failure modes in spec.md §7:
//! corpus I/O, an empty corpus, and an undersized vocabulary. Per-crate
//! errors that are purely local (e.g. bitstream underflow) live next to the
//! type that raises them instead of in here.

use std::path::PathBuf;

/// Errors surfaced by corpus ingestion and partitioner construction.
#[derive(Debug, thiserror::Error)]
pub enum ZenError {
    /// No Han code points were found anywhere in the given corpus.
    #[error("corpus contains no Han code points")]
    CorpusEmpty,

    /// `V / (K+1) - 1 < 2`: the vocabulary is too small to build `K` trees
    /// with at least two leaves each plus a tail reserve.
    #[error(
        "vocabulary too small for {tree_count} trees: {vocabulary_size} words yield only \
         {per_tree} words per tree (need at least {min_required})"
    )]
    VocabularyTooSmall {
        vocabulary_size: usize,
        tree_count: usize,
        per_tree: usize,
        min_required: usize,
    },

    /// A filesystem or persistence operation failed.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted-blob deserialization failed (corrupt or foreign data).
    #[error("failed to decode persisted partitioner: {0}")]
    Persistence(#[from] bincode::Error),

    /// `decode_cipher`'s framing stage failed: the decoded payload was too
    /// short to contain a 16-byte IV, or AES-CBC/PKCS7 unpadding rejected
    /// the ciphertext (wrong key, or a non-cipher payload passed by
    /// mistake).
    #[error("cipher framing error: {0}")]
    CipherFraming(String),
}
