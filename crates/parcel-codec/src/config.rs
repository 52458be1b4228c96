//! Codec limits.
//!
//! Limits can be built in code or read from the `[codec]` table of a TOML
//! file:
//!
//! ```toml
//! [codec]
//! max_depth = 32
//! max_content_size = 1048576
//! max_frame_size = 2097152
//! ```
//!
//! Missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default nesting limit for maps and lists.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Largest accepted `max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 512;

/// Default limit for encoded content (64 MiB).
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 64 * 1024 * 1024;

/// Default limit for a whole encoded message frame (64 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Bounds applied while encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecLimits {
    /// Deepest allowed nesting; top-level content is depth 1. At most
    /// [`MAX_DEPTH_LIMIT`].
    pub max_depth: usize,

    /// Largest encoded content, in bytes.
    pub max_content_size: usize,

    /// Largest message frame, in bytes, excluding the length prefix.
    pub max_frame_size: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    codec: CodecLimits,
}

impl CodecLimits {
    /// Builder: set the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builder: set the content size limit.
    pub fn with_max_content_size(mut self, max: usize) -> Self {
        self.max_content_size = max;
        self
    }

    /// Builder: set the frame size limit.
    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    /// Parses limits from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        file.codec.validate()?;
        Ok(file.codec)
    }

    /// Loads limits from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let limits = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?limits, "loaded codec limits");
        Ok(limits)
    }

    /// Rejects limits no content could satisfy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::invalid("max_depth must be at least 1"));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::invalid(format!(
                "max_depth must be at most {MAX_DEPTH_LIMIT}, got {}",
                self.max_depth
            )));
        }
        // An empty map or list body is 8 bytes.
        if self.max_content_size < 8 {
            return Err(ConfigError::invalid("max_content_size must be at least 8"));
        }
        if self.max_frame_size < 8 {
            return Err(ConfigError::invalid("max_frame_size must be at least 8"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_limits() {
        let limits = CodecLimits::default();
        assert_eq!(limits.max_depth, 128);
        assert_eq!(limits.max_content_size, 64 * 1024 * 1024);
        assert_eq!(limits.max_frame_size, 64 * 1024 * 1024);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let limits = CodecLimits::default()
            .with_max_depth(4)
            .with_max_content_size(1024)
            .with_max_frame_size(2048);
        assert_eq!(limits.max_depth, 4);
        assert_eq!(limits.max_content_size, 1024);
        assert_eq!(limits.max_frame_size, 2048);
    }

    #[test]
    fn parse_partial_table() {
        let limits = CodecLimits::from_toml_str("[codec]\nmax_depth = 8\n").unwrap();
        assert_eq!(limits.max_depth, 8);
        assert_eq!(limits.max_content_size, DEFAULT_MAX_CONTENT_SIZE);
    }

    #[test]
    fn parse_empty_text_uses_defaults() {
        assert_eq!(CodecLimits::from_toml_str("").unwrap(), CodecLimits::default());
    }

    #[test]
    fn parse_rejects_wrong_types() {
        let err = CodecLimits::from_toml_str("[codec]\nmax_depth = \"deep\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parse_rejects_zero_depth() {
        let err = CodecLimits::from_toml_str("[codec]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("max_depth"));
    }

    #[test]
    fn parse_rejects_depth_above_limit() {
        let err = CodecLimits::from_toml_str("[codec]\nmax_depth = 10000000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("at most 512"));

        let limits = CodecLimits::from_toml_str("[codec]\nmax_depth = 512\n").unwrap();
        assert_eq!(limits.max_depth, MAX_DEPTH_LIMIT);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[codec]\nmax_content_size = 4096").unwrap();

        let limits = CodecLimits::load(file.path()).unwrap();
        assert_eq!(limits.max_content_size, 4096);
        assert_eq!(limits.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CodecLimits::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
