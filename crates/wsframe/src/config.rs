use serde::Deserialize;
use std::path::Path;

/// Non-returning frames tolerated within one message read.
pub const DEFAULT_CONTINUATION_LIMIT: usize = 100;

/// Limits applied by a [`Connection`](crate::Connection) while reading.
///
/// Loaded from TOML, every key optional:
///
/// ```toml
/// continuation_limit = 100
/// max_frame_size = 1048576
/// max_message_size = 16777216
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Frames that do not complete a message (continuations, pings, pongs)
    /// allowed in one read before it fails.
    pub continuation_limit: usize,
    /// Largest declared payload length accepted for a single frame.
    /// `None` accepts any 63-bit length.
    pub max_frame_size: Option<u64>,
    /// Largest reassembled message payload. `None` means unbounded.
    pub max_message_size: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            continuation_limit: DEFAULT_CONTINUATION_LIMIT,
            max_frame_size: None,
            max_message_size: None,
        }
    }
}

impl ReaderConfig {
    /// Read and parse a reader config from a TOML file.
    pub fn from_file(path: &Path) -> Result<ReaderConfig, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    /// Parse a reader config from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<ReaderConfig, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse reader config: {}", e))
    }

    pub fn with_continuation_limit(mut self, limit: usize) -> Self {
        self.continuation_limit = limit;
        self
    }

    pub fn with_max_frame_size(mut self, max: u64) -> Self {
        self.max_frame_size = Some(max);
        self
    }

    pub fn with_max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = Some(max);
        self
    }
}
