use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{UnpanelError, UnpanelResult};

/// Largest grid the tile scrambler will build (256 x 256)
pub const MAX_TOTAL_TILES: usize = 1 << 16;

/// Top-level reconstruction configuration (loaded from unpanel.toml)
///
/// Every default reproduces the protected transport exactly; changing
/// `tiles` or `payload` values only makes sense against a server that was
/// changed the same way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnpanelConfig {
    pub tiles: TileConfig,
    pub payload: PayloadConfig,
    pub pipeline: PipelineConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Tiles per grid side; total tiles = grid_size² (default: 10)
    pub grid_size: usize,
    /// Feistel rounds per index pair in the first permutation pass (default: 4)
    pub feistel_rounds: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadConfig {
    /// Leading bytes ignored before the nonce (default: 128)
    pub prefix_len: usize,
}

/// Bytes handed back when a page cannot be reconstructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The payload exactly as it arrived
    Original,
    /// The payload after the decryption attempt, before descrambling
    Decrypted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// What the infallible entry point returns on failure (default: original)
    pub on_failure: FailurePolicy,
    /// Reconstruct chapter pages on the rayon pool (default: true)
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or EnvFilter directive (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            feistel_rounds: 4,
        }
    }
}

impl TileConfig {
    /// Tiles in the grid, or `None` if `grid_size²` overflows.
    pub fn total_tiles(&self) -> Option<usize> {
        self.grid_size.checked_mul(self.grid_size)
    }
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self { prefix_len: 128 }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            on_failure: FailurePolicy::Original,
            parallel: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl UnpanelConfig {
    /// Parse and validate a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(s: &str) -> UnpanelResult<Self> {
        let config: UnpanelConfig =
            toml::from_str(s).map_err(|e| UnpanelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file from disk.
    pub fn load(path: &Path) -> UnpanelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded unpanel config");
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> UnpanelResult<()> {
        if self.tiles.grid_size == 0 {
            return Err(UnpanelError::Config("tiles.grid_size must be > 0".into()));
        }
        if self.tiles.feistel_rounds == 0 {
            return Err(UnpanelError::Config("tiles.feistel_rounds must be > 0".into()));
        }
        let fits = matches!(self.tiles.total_tiles(), Some(total) if total <= MAX_TOTAL_TILES);
        if !fits {
            return Err(UnpanelError::Config(format!(
                "tiles.grid_size {} exceeds {MAX_TOTAL_TILES} tiles",
                self.tiles.grid_size
            )));
        }
        match self.log.format.as_str() {
            "json" | "text" => Ok(()),
            other => Err(UnpanelError::Config(format!(
                "log.format must be \"json\" or \"text\", got {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err(toml_str: &str) -> UnpanelError {
        UnpanelConfig::from_toml_str(toml_str).unwrap_err()
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[tiles]
grid_size = 8
feistel_rounds = 6

[payload]
prefix_len = 64

[pipeline]
on_failure = "decrypted"
parallel = false

[log]
level = "debug"
format = "json"
"#;
        let config = UnpanelConfig::from_toml_str(toml_str).unwrap();

        assert_eq!(config.tiles.grid_size, 8);
        assert_eq!(config.tiles.total_tiles(), Some(64));
        assert_eq!(config.tiles.feistel_rounds, 6);
        assert_eq!(config.payload.prefix_len, 64);
        assert_eq!(config.pipeline.on_failure, FailurePolicy::Decrypted);
        assert!(!config.pipeline.parallel);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
    }

    #[test]
    fn test_parse_defaults() {
        let config = UnpanelConfig::from_toml_str("").unwrap();

        assert_eq!(config.tiles.grid_size, 10);
        assert_eq!(config.tiles.total_tiles(), Some(100));
        assert_eq!(config.tiles.feistel_rounds, 4);
        assert_eq!(config.payload.prefix_len, 128);
        assert_eq!(config.pipeline.on_failure, FailurePolicy::Original);
        assert!(config.pipeline.parallel);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[log]
level = "unpanel=trace"
"#;
        let config = UnpanelConfig::from_toml_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.log.level, "unpanel=trace");
        // Defaults
        assert_eq!(config.log.format, "text");
        assert_eq!(config.tiles.grid_size, 10);
    }

    #[test]
    fn test_rejects_zero_grid() {
        let err = parse_err("[tiles]\ngrid_size = 0\n");
        assert!(matches!(err, UnpanelError::Config(_)));
        assert!(err.to_string().contains("grid_size"));
    }

    #[test]
    fn test_rejects_oversized_grid() {
        // largest grid that fits
        let largest = "[tiles]\ngrid_size = 256\n";
        let config = UnpanelConfig::from_toml_str(largest).unwrap();
        assert_eq!(config.tiles.total_tiles(), Some(MAX_TOTAL_TILES));

        let err = parse_err("[tiles]\ngrid_size = 257\n");
        assert!(matches!(err, UnpanelError::Config(_)));
        assert!(err.to_string().contains("grid_size"));

        // grid_size² overflows usize
        let err = parse_err("[tiles]\ngrid_size = 4294967296\n");
        assert!(matches!(err, UnpanelError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let err = parse_err("[log]\nformat = \"xml\"\n");
        assert!(err.to_string().contains("log.format"));
    }

    #[test]
    fn test_rejects_unknown_failure_policy() {
        let err = parse_err("[pipeline]\non_failure = \"panic\"\n");
        assert!(matches!(err, UnpanelError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = parse_err("[tiles\ngrid_size = ");
        assert!(matches!(err, UnpanelError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = Path::new("/nonexistent/unpanel.toml");
        let err = UnpanelConfig::load(path).unwrap_err();
        assert!(matches!(err, UnpanelError::Io(_)));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = UnpanelConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = UnpanelConfig::from_toml_str(&toml_str).unwrap();

        assert_eq!(config.tiles.grid_size, parsed.tiles.grid_size);
        assert_eq!(config.payload.prefix_len, parsed.payload.prefix_len);
        assert_eq!(config.log.format, parsed.log.format);
    }
}
