//! AES-256-GCM envelope for FBR API keys at rest.
//!
//! Each key is sealed with a fresh random nonce and stored as a single
//! printable token of three base64 segments joined by `:`
//! (`nonce:ciphertext:tag`). The 256-bit sealing key is derived from the
//! configured secret with SHA-256 and is never persisted. The token format
//! must stay stable for a deployment; changing the cipher or delimiter
//! invalidates every stored value.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};

/// Size of the derived sealing key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of the nonce in bytes (96 bits, standard for GCM)
const NONCE_SIZE: usize = 12;

/// Size of the GCM authentication tag in bytes
const TAG_SIZE: usize = 16;

/// Classified envelope failures.
///
/// `MissingSecret` is a configuration error and fatal for the call.
/// `MalformedToken` and `AuthenticationFailed` are collapsed into one
/// generic failure at the HTTP boundary; the distinction is logged
/// server-side only.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    /// Credential secret is missing or empty
    MissingSecret,
    /// Token does not parse into nonce/ciphertext/tag segments
    MalformedToken(String),
    /// Tag verification failed (tampered data or wrong secret)
    AuthenticationFailed,
    /// Sealing the plaintext failed
    EncryptionFailed,
    /// Decrypted bytes are not valid UTF-8
    InvalidPlaintext,
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvelopeError::MissingSecret => {
                write!(f, "Credential secret is missing or empty")
            }
            EnvelopeError::MalformedToken(reason) => {
                write!(f, "Malformed credential token: {}", reason)
            }
            EnvelopeError::AuthenticationFailed => {
                write!(f, "Credential token failed integrity check")
            }
            EnvelopeError::EncryptionFailed => write!(f, "Encryption failed"),
            EnvelopeError::InvalidPlaintext => {
                write!(f, "Decrypted credential is not valid UTF-8")
            }
        }
    }
}

impl std::error::Error for EnvelopeError {}

/// Derives the 256-bit sealing key from the configured secret.
///
/// The secret is hashed with SHA-256, so any non-empty secret yields a
/// full-length key. Deterministic: the same secret always derives the
/// same key.
///
/// # Errors
/// * `MissingSecret` - secret is empty
pub fn derive_key(secret: &str) -> Result<[u8; KEY_SIZE], EnvelopeError> {
    if secret.is_empty() {
        return Err(EnvelopeError::MissingSecret);
    }
    Ok(Sha256::digest(secret.as_bytes()).into())
}

/// Encrypts an API key using AES-256-GCM with a random nonce.
///
/// # Arguments
/// * `plaintext` - API key to seal
/// * `key` - 32-byte sealing key from [`derive_key`]
///
/// # Returns
/// A `nonce:ciphertext:tag` token, each segment base64-encoded.
///
/// # Security
/// - A fresh nonce is drawn from the OS CSPRNG on every call (never reuse)
/// - Authenticated encryption (tampering detected on decrypt)
/// - The sealing key lives in memory only
pub fn encrypt(plaintext: &str, key: &[u8; KEY_SIZE]) -> Result<String, EnvelopeError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    // Generate random nonce (never reuse!)
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    // The aead crate appends the 16-byte tag to the ciphertext
    let sealed = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| EnvelopeError::EncryptionFailed)?;
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_SIZE);

    Ok(format!(
        "{}:{}:{}",
        BASE64.encode(nonce),
        BASE64.encode(ciphertext),
        BASE64.encode(tag)
    ))
}

/// Decrypts a token produced by [`encrypt`].
///
/// # Arguments
/// * `token` - `nonce:ciphertext:tag` token
/// * `key` - 32-byte sealing key (must match the one used to encrypt)
///
/// # Errors
/// * `MalformedToken` - wrong segment count, invalid base64, or wrong
///   nonce/tag length; the reason never includes the stored value
/// * `AuthenticationFailed` - tag mismatch (tampered data or wrong secret)
/// * `InvalidPlaintext` - sealed bytes did not decode to UTF-8
pub fn decrypt(token: &str, key: &[u8; KEY_SIZE]) -> Result<String, EnvelopeError> {
    let segments: Vec<&str> = token.split(':').collect();
    if segments.len() != 3 {
        return Err(EnvelopeError::MalformedToken(format!(
            "expected 3 segments, got {}",
            segments.len()
        )));
    }

    let nonce_bytes = BASE64
        .decode(segments[0])
        .map_err(|_| EnvelopeError::MalformedToken("invalid base64 in nonce segment".into()))?;
    let ciphertext = BASE64
        .decode(segments[1])
        .map_err(|_| EnvelopeError::MalformedToken("invalid base64 in ciphertext segment".into()))?;
    let tag = BASE64
        .decode(segments[2])
        .map_err(|_| EnvelopeError::MalformedToken("invalid base64 in tag segment".into()))?;

    if nonce_bytes.len() != NONCE_SIZE {
        return Err(EnvelopeError::MalformedToken(format!(
            "nonce must be {} bytes, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }
    if tag.len() != TAG_SIZE {
        return Err(EnvelopeError::MalformedToken(format!(
            "tag must be {} bytes, got {}",
            TAG_SIZE,
            tag.len()
        )));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let nonce = Nonce::from_slice(&nonce_bytes);

    // Rejoin ciphertext and tag the way the aead crate expects them
    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);

    let plaintext = cipher
        .decrypt(nonce, sealed.as_ref())
        .map_err(|_| EnvelopeError::AuthenticationFailed)?;

    String::from_utf8(plaintext).map_err(|_| EnvelopeError::InvalidPlaintext)
}
