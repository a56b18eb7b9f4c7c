//! unpanel: reconstruct protected comic page images
//!
//! Pipeline per page:
//! ```text
//! payload → AES-256-GCM decrypt (or keep as-is) → sniff
//!         → seed(series, chapter, page) → tile mapping → unscramble → sniff
//! ```
//!
//! Pages are independent: no state survives between calls, and a chapter's
//! pages can be rebuilt in parallel.

pub mod pipeline;
pub mod sniff;
#[cfg(feature = "tracing-init")]
pub mod telemetry;

pub use pipeline::{reconstruct, Outcome, Reconstructed, Reconstructor};
pub use sniff::{detect_format, looks_like_image, ImageFormat};

pub use unpanel_core::{
    FailurePolicy, PageRequest, Seed, TileMapping, UnpanelConfig, UnpanelError, UnpanelResult,
};
