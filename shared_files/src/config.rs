//! Construction-time defaults shared across the workspace, the way
//! `core_header::FILE_EXTENSION` was shared across the teacher's modules.

/// Default tree count `K` for a [`Partitioner`](../../partitioner_module/struct.Partitioner.html),
/// matching the reference implementation (spec.md §6).
pub const DEFAULT_TREE_COUNT: usize = 12;

/// Minimum number of leaves a Huffman tree must have for a partitioning to be
/// considered valid (spec.md §6: `V/(K+1)-1 >= 2`).
pub const MIN_LEAVES_PER_TREE: usize = 2;

/// Extension used for a persisted (saved) partitioner blob.
pub const PARTITIONER_FILE_EXTENSION: &str = ".zencoder";

/// IV length, in bytes, used by the AES-256-CBC pre/post-processing stage.
pub const CIPHER_IV_LEN: usize = 16;
