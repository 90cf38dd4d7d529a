//! Opaque `Partitioner` persistence (spec.md §4.5, §7 "Partitioner
//! persistence"): a self-contained blob sufficient to reconstruct the K
//! trees, their reverse indices, the tail-code assignments, and the
//! `WordGraph`. The on-disk format is implementation-defined; this uses
//! `bincode` over the type's own `serde` impls, the same pairing the pack's
//! codec example (wrightdylan-codecs) reaches for.

use std::fs;
use std::path::Path;

use partitioner_module::Partitioner;
use shared_files::ZenError;

fn io_err(path: &Path, source: std::io::Error) -> ZenError {
    ZenError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Serializes `partitioner` to `path` as a single opaque blob.
pub fn save_partitioner(partitioner: &Partitioner, path: impl AsRef<Path>) -> Result<(), ZenError> {
    let path = path.as_ref();
    let bytes = bincode::serialize(partitioner)?;
    fs::write(path, bytes).map_err(|e| io_err(path, e))
}

/// Deserializes a `Partitioner` previously written by [`save_partitioner`].
/// `load(save(p))` behaves identically to `p` for all subsequent
/// encode/decode calls, since every field the trees and graph need is
/// carried in the blob verbatim.
pub fn load_partitioner(path: impl AsRef<Path>) -> Result<Partitioner, ZenError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(bincode::deserialize(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use wordgraph_module::WordGraph;

    fn sample_graph() -> WordGraph {
        let corpus: Vec<char> = "的一是在不了有和人这的一是在不了有和人这"
            .chars()
            .collect();
        let mut graph = WordGraph::new();
        for pair in corpus.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        graph
    }

    #[test]
    fn save_then_load_round_trips_encode_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.zencoder");

        let mut rng = SmallRng::seed_from_u64(9);
        let original = Partitioner::build(sample_graph(), 2, &mut rng).unwrap();
        save_partitioner(&original, &path).unwrap();

        let loaded = load_partitioner(&path).unwrap();
        assert_eq!(loaded.tree_count(), original.tree_count());

        let mut stream = bitstream_module::BitStream::from_bytes(&[0x42]);
        let words = loaded.encode(&mut stream, &mut rng);
        let mut decoded = loaded.decode(&words).unwrap();
        assert_eq!(decoded.to_bytes(), vec![0x42]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_partitioner("/nonexistent/path/does-not-exist.zencoder").unwrap_err();
        assert!(matches!(err, ZenError::Io { .. }));
    }
}
