//! unpanel-crypto: per-page key material for the protected image transport
//!
//! Everything here is a pure function of the page identifiers:
//! ```text
//! seriesId:chapterId              ──SHA-256──▶ ContentKey (AES-256-GCM)
//! seriesId:chapterId:NNNN.jpg     ──SHA-256──▶ Seed (first 8 bytes, BE)
//! decimal(Seed)                   ──SHA-256──▶ PRNG state (hi ^ lo)
//! decimal(Seed)                   ──SHA-512──▶ EntropyPool (64 bytes)
//! ```
//!
//! Encrypted payload format (binary):
//! ```text
//! [128 bytes: ignored prefix][12 bytes: nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! ```

pub mod page;
pub mod seed;

pub use page::{
    decrypt_page, decrypt_page_with, decrypt_with_key, derive_content_key, encrypt_page, ContentKey,
};
pub use seed::{
    derive_entropy_pool, derive_page_seed, derive_seed, hash_seed_state, page_label, EntropyPool,
};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Leading bytes of an encrypted payload that carry no meaning for decryption
pub const PREFIX_SIZE: usize = 128;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Minimum payload length for decryption to be attempted
pub const HEADER_SIZE: usize = PREFIX_SIZE + NONCE_SIZE;
