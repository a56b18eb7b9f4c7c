use thiserror::Error;

pub type UnpanelResult<T> = Result<T, UnpanelError>;

#[derive(Debug, Error)]
pub enum UnpanelError {
    /// AEAD authentication failed or the payload was too short to carry a nonce.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Descrambled bytes still do not look like any known image container.
    #[error("reconstruction error: {0}")]
    Reconstruction(String),

    #[error("invalid tile mapping: {0}")]
    InvalidMapping(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
