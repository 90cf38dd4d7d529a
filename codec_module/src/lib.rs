//! The codec façade (spec.md §4.5): turns a [`Partitioner`] into four plain
//! functions a caller actually reaches for, `encode_plain`/`decode_plain`
//! and their AES-CBC-wrapped counterparts, plus opaque persistence for a
//! constructed `Partitioner`.

mod cipher;
mod persistence;

use bitstream_module::BitStream;
use partitioner_module::Partitioner;
use rand::Rng;
use shared_files::ZenError;

pub use persistence::{load_partitioner, save_partitioner};

/// Encodes `bytes` as a sequence of Han characters, with no cipher stage.
pub fn encode_plain<R: Rng + ?Sized>(
    partitioner: &Partitioner,
    bytes: &[u8],
    rng: &mut R,
) -> String {
    let mut stream = BitStream::from_bytes(bytes);
    partitioner.encode(&mut stream, rng).into_iter().collect()
}

/// Recovers the bytes encoded by `text`, or `None` if `text` contains a
/// character `partitioner` doesn't recognize (spec.md §7
/// `DecodeUnknownWord`).
pub fn decode_plain(partitioner: &Partitioner, text: &str) -> Option<Vec<u8>> {
    let words: Vec<char> = text.chars().collect();
    let mut stream = partitioner.decode(&words)?;
    Some(stream.to_bytes())
}

/// AES-256-CBC-encrypts `bytes` under `key` behind a freshly generated IV,
/// prepends the IV to the ciphertext, then runs the result through
/// [`encode_plain`] (spec.md §4.5).
pub fn encode_cipher<R: Rng + ?Sized>(
    partitioner: &Partitioner,
    bytes: &[u8],
    key: &[u8; 32],
    rng: &mut R,
) -> String {
    let framed = cipher::encrypt(bytes, key, rng);
    encode_plain(partitioner, &framed, rng)
}

/// Inverse of [`encode_cipher`]: decodes `text`, splits off the leading IV,
/// and AES-256-CBC-decrypts the remainder under `key`.
///
/// Returns `None` if `text` doesn't decode, or if the cipher stage fails
/// (too short to contain an IV, or a padding/integrity mismatch,
/// [`ZenError::CipherFraming`]).
pub fn decode_cipher(partitioner: &Partitioner, text: &str, key: &[u8; 32]) -> Option<Vec<u8>> {
    let framed = decode_plain(partitioner, text)?;
    cipher::decrypt(&framed, key).ok()
}

/// Re-exported so callers building their own framing can see construction
/// failures distinctly from decode failures.
pub type CodecError = ZenError;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use wordgraph_module::WordGraph;

    fn sample_partitioner() -> Partitioner {
        let corpus: Vec<char> = "的一是在不了有和人这的一是在不了有和人这的一是在不了有和人这"
            .chars()
            .collect();
        let mut graph = WordGraph::new();
        for pair in corpus.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        let mut rng = SmallRng::seed_from_u64(11);
        Partitioner::build(graph, 2, &mut rng).unwrap()
    }

    #[test]
    fn plain_round_trip() {
        let partitioner = sample_partitioner();
        let mut rng = SmallRng::seed_from_u64(12);
        let text = encode_plain(&partitioner, b"hello, zencoder", &mut rng);
        assert!(text.chars().all(|c| c != '\0'));
        let recovered = decode_plain(&partitioner, &text).unwrap();
        assert_eq!(recovered, b"hello, zencoder");
    }

    #[test]
    fn plain_decode_rejects_unknown_character() {
        let partitioner = sample_partitioner();
        assert!(decode_plain(&partitioner, "龘").is_none());
    }

    #[test]
    fn cipher_round_trip() {
        let partitioner = sample_partitioner();
        let mut rng = SmallRng::seed_from_u64(13);
        let key = [9u8; 32];
        let text = encode_cipher(&partitioner, b"a secret payload", &key, &mut rng);
        let recovered = decode_cipher(&partitioner, &text, &key).unwrap();
        assert_eq!(recovered, b"a secret payload");
    }

    #[test]
    fn cipher_decode_rejects_wrong_key() {
        let partitioner = sample_partitioner();
        let mut rng = SmallRng::seed_from_u64(14);
        let text = encode_cipher(&partitioner, b"a secret payload", &[1u8; 32], &mut rng);
        assert!(decode_cipher(&partitioner, &text, &[2u8; 32]).is_none());
    }

    proptest! {
        #[test]
        fn plain_round_trip_arbitrary_bytes(
            bytes in proptest::collection::vec(any::<u8>(), 0..64),
            seed in any::<u64>(),
        ) {
            let partitioner = sample_partitioner();
            let mut rng = SmallRng::seed_from_u64(seed);
            let text = encode_plain(&partitioner, &bytes, &mut rng);
            let recovered = decode_plain(&partitioner, &text).unwrap();
            prop_assert_eq!(recovered, bytes);
        }
    }
}
