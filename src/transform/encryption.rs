//! Encryption Codec
//!
//! AES-256-CBC with PKCS#7 padding and a key/IV fixed for the lifetime of a
//! cache instance. Ciphertext is carried as lowercase hex text.
//!
//! The material never changes, so equal plaintexts produce equal ciphertexts.
//! CBC also carries no integrity tag: a corrupted payload decrypts to garbage
//! unless the padding check happens to fail.

use std::fmt;

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};

use crate::error::{CacheError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Cipher identifier shown in the redacted `Debug` output.
pub const ALGORITHM: &str = "aes-256-cbc";
/// Key length in bytes.
pub const KEY_LEN: usize = 32;
/// Initialization vector length in bytes.
pub const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

// == Encryption Material ==
/// Key and IV used by one cache instance.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionMaterial {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl EncryptionMaterial {
    pub fn new(key: [u8; KEY_LEN], iv: [u8; IV_LEN]) -> Self {
        Self { key, iv }
    }

    /// Fresh material from the operating system RNG.
    pub fn random() -> Self {
        Self::new(random_key(), random_iv())
    }

    // == Encrypt ==
    /// Encrypts UTF-8 text and returns the ciphertext as hex.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let cipher = Aes256CbcEnc::new(&self.key.into(), &self.iv.into());
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        hex::encode(ciphertext)
    }

    // == Decrypt ==
    /// Decrypts hex ciphertext produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, ciphertext_hex: &str) -> Result<String> {
        let ciphertext = hex::decode(ciphertext_hex)
            .map_err(|e| CacheError::Crypto(format!("ciphertext is not hex: {}", e)))?;

        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CacheError::Crypto(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_LEN
            )));
        }

        let cipher = Aes256CbcDec::new(&self.key.into(), &self.iv.into());
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CacheError::Crypto("bad padding (wrong key or IV?)".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| CacheError::Crypto("decrypted payload is not UTF-8".to_string()))
    }
}

impl fmt::Debug for EncryptionMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionMaterial")
            .field("algorithm", &ALGORITHM)
            .field("key", &"<redacted>")
            .field("iv", &"<redacted>")
            .finish()
    }
}

pub fn random_key() -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    key
}

pub fn random_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Decodes hex into a fixed-size array, rejecting any other length.
pub fn parse_hex<const N: usize>(text: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(text.trim())
        .map_err(|e| CacheError::Config(format!("{} is not valid hex: {}", what, e)))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        CacheError::Config(format!(
            "{} must be {} bytes, got {}",
            what,
            N,
            bytes.len()
        ))
    })
}
