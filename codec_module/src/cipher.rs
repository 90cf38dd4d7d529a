//! The AES-256-CBC pre/post-processing stage (spec.md §4.5, §1 "AES-CBC
//! framing is a pre/post-processing pipeline external to the core"). Kept as
//! its own module so the codec façade can treat it as a swappable
//! collaborator, matching the boundary the specification itself draws.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::Rng;
use shared_files::config::CIPHER_IV_LEN;
use shared_files::ZenError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypts `plaintext` under `key` with a freshly drawn random IV, and
/// returns `iv || ciphertext`.
pub fn encrypt<R: Rng + ?Sized>(plaintext: &[u8], key: &[u8; 32], rng: &mut R) -> Vec<u8> {
    let mut iv = [0u8; CIPHER_IV_LEN];
    rng.fill(&mut iv);

    let ciphertext = Aes256CbcEnc::new(
        GenericArray::from_slice(key),
        GenericArray::from_slice(&iv),
    )
    .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut framed = Vec::with_capacity(CIPHER_IV_LEN + ciphertext.len());
    framed.extend_from_slice(&iv);
    framed.extend_from_slice(&ciphertext);
    framed
}

/// Splits the leading IV off `framed` and AES-256-CBC-decrypts the
/// remainder under `key`.
pub fn decrypt(framed: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, ZenError> {
    if framed.len() < CIPHER_IV_LEN {
        return Err(ZenError::CipherFraming(format!(
            "payload is {} bytes, too short to hold a {CIPHER_IV_LEN}-byte IV",
            framed.len()
        )));
    }
    let (iv, ciphertext) = framed.split_at(CIPHER_IV_LEN);

    Aes256CbcDec::new(GenericArray::from_slice(key), GenericArray::from_slice(iv))
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| ZenError::CipherFraming(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn round_trip() {
        let key = [7u8; 32];
        let mut rng = SmallRng::seed_from_u64(42);
        let plaintext = b"a message that spans more than one AES block easily";

        let framed = encrypt(plaintext, &key, &mut rng);
        assert!(framed[..CIPHER_IV_LEN].iter().any(|&b| b != 0));

        let recovered = decrypt(&framed, &key).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        let framed = encrypt(b"secret", &[1u8; 32], &mut rng);
        assert!(decrypt(&framed, &[2u8; 32]).is_err());
    }

    #[test]
    fn truncated_payload_is_rejected() {
        assert!(decrypt(&[0u8; 4], &[0u8; 32]).is_err());
    }
}
