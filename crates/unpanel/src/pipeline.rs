//! Page reconstruction pipeline.
//!
//! 1. Try AES-256-GCM with the chapter key; on failure assume plaintext.
//! 2. If the bytes already sniff as an image, stop.
//! 3. Derive the page seed, build the tile mapping, unscramble.
//! 4. If the result sniffs as an image, return it; otherwise fail.
//!
//! [`Reconstructor::reconstruct_or_original`] is the transport-facing entry
//! point: it never fails and degrades to returning some bytes, so one broken
//! page cannot abort a chapter download.

use std::borrow::Cow;

use rayon::prelude::*;
use tracing::{debug, info, warn};
use unpanel_core::{FailurePolicy, PageRequest, UnpanelConfig, UnpanelError, UnpanelResult};
use unpanel_crypto::{decrypt_page_with, derive_seed, page_label};
use unpanel_tiles::{unscramble, Scrambler};

use crate::sniff::{detect_format, ImageFormat};

/// Which path a page took through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Neither encrypted nor scrambled
    Plain,
    /// Encrypted only
    Decrypted,
    /// Scrambled, and possibly encrypted as well
    Descrambled { decrypted: bool },
}

/// A successfully rebuilt page
#[derive(Debug, Clone)]
pub struct Reconstructed {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub outcome: Outcome,
}

/// A failed attempt, keeping the decryption result for the failure policy.
struct Failure {
    error: UnpanelError,
    decrypted: Option<Vec<u8>>,
}

impl Failure {
    fn new(error: UnpanelError, decrypted: Option<Vec<u8>>) -> Self {
        Self { error, decrypted }
    }
}

/// Stateless page reconstructor; cheap to share across worker threads.
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    config: UnpanelConfig,
}

impl Reconstructor {
    pub fn new(config: UnpanelConfig) -> UnpanelResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &UnpanelConfig {
        &self.config
    }

    /// Rebuild one page, reporting why if it could not be rebuilt.
    pub fn reconstruct(
        &self,
        payload: &[u8],
        request: &PageRequest,
    ) -> UnpanelResult<Reconstructed> {
        self.attempt(payload, request).map_err(|f| f.error)
    }

    /// Rebuild one page; on failure return bytes chosen by `pipeline.on_failure`.
    pub fn reconstruct_or_original(&self, payload: Vec<u8>, request: &PageRequest) -> Vec<u8> {
        match self.attempt(&payload, request) {
            Ok(page) => page.bytes,
            Err(failure) => {
                warn!(
                    series = %request.series_id,
                    chapter = %request.chapter_id,
                    page = request.page_index,
                    bytes = payload.len(),
                    error = %failure.error,
                    "page reconstruction failed, passing bytes through"
                );
                match (self.config.pipeline.on_failure, failure.decrypted) {
                    (FailurePolicy::Decrypted, Some(decrypted)) => decrypted,
                    _ => payload,
                }
            }
        }
    }

    /// Rebuild every page of a chapter, preserving input order.
    ///
    /// Pages never share state, so with `pipeline.parallel` they run on the
    /// rayon pool without coordination.
    pub fn reconstruct_chapter(&self, pages: Vec<(PageRequest, Vec<u8>)>) -> Vec<Vec<u8>> {
        let started = std::time::Instant::now();
        let count = pages.len();

        let out: Vec<Vec<u8>> = if self.config.pipeline.parallel {
            pages
                .into_par_iter()
                .map(|(request, payload)| self.reconstruct_or_original(payload, &request))
                .collect()
        } else {
            pages
                .into_iter()
                .map(|(request, payload)| self.reconstruct_or_original(payload, &request))
                .collect()
        };

        info!(
            pages = count,
            parallel = self.config.pipeline.parallel,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chapter reconstructed"
        );
        out
    }

    /// Open an encrypted payload with the chapter key.
    pub fn decrypt(&self, payload: &[u8], request: &PageRequest) -> UnpanelResult<Vec<u8>> {
        decrypt_page_with(
            payload,
            &request.series_id,
            &request.chapter_id,
            self.config.payload.prefix_len,
        )
        .map_err(|e| UnpanelError::Decryption(format!("{e:#}")))
    }

    fn attempt(&self, payload: &[u8], request: &PageRequest) -> Result<Reconstructed, Failure> {
        let PageRequest {
            series_id,
            chapter_id,
            page_index,
        } = request;

        let (bytes, decrypt_error) = match self.decrypt(payload, request) {
            Ok(plain) => (Cow::Owned(plain), None),
            Err(e) => {
                debug!(page = page_index, error = %e, "treating payload as plaintext");
                (Cow::Borrowed(payload), Some(e))
            }
        };
        let decrypted = decrypt_error.is_none();

        if let Some(format) = detect_format(&bytes) {
            let outcome = if decrypted {
                Outcome::Decrypted
            } else {
                Outcome::Plain
            };
            debug!(page = page_index, ?format, ?outcome, "page is not scrambled");
            return Ok(Reconstructed {
                bytes: bytes.into_owned(),
                format,
                outcome,
            });
        }

        let kept = |bytes: &Cow<'_, [u8]>| decrypted.then(|| bytes.to_vec());

        let seed = derive_seed(series_id, chapter_id, &page_label(*page_index));
        let tiles = &self.config.tiles;
        let mapping = Scrambler::with_rounds(seed, tiles.grid_size, tiles.feistel_rounds)
            .map(|s| s.mapping())
            .map_err(|e| Failure::new(e, kept(&bytes)))?;
        let restored = unscramble(&bytes, &mapping).map_err(|e| Failure::new(e, kept(&bytes)))?;

        match detect_format(&restored) {
            Some(format) => {
                debug!(page = page_index, %seed, ?format, decrypted, "page descrambled");
                Ok(Reconstructed {
                    bytes: restored,
                    format,
                    outcome: Outcome::Descrambled { decrypted },
                })
            }
            None => {
                let mut reason = format!(
                    "page {page_index} of {series_id}/{chapter_id} is not a known image after descrambling (seed {seed})"
                );
                if let Some(e) = decrypt_error {
                    reason.push_str(&format!("; {e}"));
                }
                Err(Failure::new(UnpanelError::Reconstruction(reason), kept(&bytes)))
            }
        }
    }
}

/// One-shot reconstruction with the default transport parameters.
pub fn reconstruct(
    payload: &[u8],
    page_index: u32,
    series_id: &str,
    chapter_id: &str,
) -> UnpanelResult<Vec<u8>> {
    let request = PageRequest::new(series_id, chapter_id, page_index);
    Reconstructor::default()
        .reconstruct(payload, &request)
        .map(|page| page.bytes)
}
