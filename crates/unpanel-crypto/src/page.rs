//! Page payload AES-256-GCM encryption/decryption
//!
//! The content key is `SHA-256("{series_id}:{chapter_id}")`. It is computed
//! locally; the license token only gates the download, not decryption.

use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit, Nonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::{KEY_SIZE, NONCE_SIZE, PREFIX_SIZE, TAG_SIZE};

/// A per-chapter 256-bit content key. Zeroized on drop.
#[derive(Clone)]
pub struct ContentKey {
    bytes: [u8; KEY_SIZE],
}

impl ContentKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for ContentKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// `SHA-256("{series_id}:{chapter_id}")`
pub fn derive_content_key(series_id: &str, chapter_id: &str) -> ContentKey {
    let digest = Sha256::new()
        .chain_update(series_id.as_bytes())
        .chain_update(b":")
        .chain_update(chapter_id.as_bytes())
        .finalize();
    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&digest);
    ContentKey::from_bytes(bytes)
}

/// Decrypt a page payload with the chapter's content key.
///
/// - `payload`: `[128-byte prefix][12-byte nonce][ciphertext][16-byte tag]`
///
/// Fails on payloads shorter than 140 bytes and on any authentication
/// failure. Callers treat a failure as "this page was never encrypted".
pub fn decrypt_page(payload: &[u8], series_id: &str, chapter_id: &str) -> anyhow::Result<Vec<u8>> {
    decrypt_page_with(payload, series_id, chapter_id, PREFIX_SIZE)
}

/// Like [`decrypt_page`] with an explicit ignored-prefix length.
pub fn decrypt_page_with(
    payload: &[u8],
    series_id: &str,
    chapter_id: &str,
    prefix_len: usize,
) -> anyhow::Result<Vec<u8>> {
    let key = derive_content_key(series_id, chapter_id);
    let body = payload.get(prefix_len..).ok_or_else(|| {
        anyhow::anyhow!(
            "payload too short: {} bytes (minimum {})",
            payload.len(),
            prefix_len + NONCE_SIZE
        )
    })?;
    decrypt_with_key(&key, body)
}

/// Decrypt `[12-byte nonce][ciphertext][16-byte tag]` with AES-256-GCM.
pub fn decrypt_with_key(key: &ContentKey, sealed: &[u8]) -> anyhow::Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE {
        anyhow::bail!(
            "sealed page too short: {} bytes (minimum {})",
            sealed.len(),
            NONCE_SIZE
        );
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher.decrypt(nonce, ciphertext).map_err(|_| {
        anyhow::anyhow!(
            "page decryption failed: wrong series/chapter id, corrupted data, or plaintext payload"
        )
    })
}

/// Encrypt a page the way the protected transport serves it.
///
/// Returns `[128 random bytes][12-byte random nonce][ciphertext][16-byte tag]`.
pub fn encrypt_page(
    plaintext: &[u8],
    series_id: &str,
    chapter_id: &str,
) -> anyhow::Result<Vec<u8>> {
    let key = derive_content_key(series_id, chapter_id);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut rng = rand::thread_rng();
    let mut header = [0u8; PREFIX_SIZE + NONCE_SIZE];
    rng.fill_bytes(&mut header);
    let nonce = Nonce::from_slice(&header[PREFIX_SIZE..]);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| anyhow::anyhow!("page encryption failed: {e}"))?;

    let mut result = Vec::with_capacity(header.len() + ciphertext.len());
    result.extend_from_slice(&header);
    result.extend_from_slice(&ciphertext);
    debug_assert_eq!(result.len(), PREFIX_SIZE + NONCE_SIZE + plaintext.len() + TAG_SIZE);
    Ok(result)
}
