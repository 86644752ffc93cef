//! Configuration file parser for ~/.config/gram/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds the maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Default cumulative page size for feed fetches.
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
///
/// Custom Debug impl masks `session_token` so the secret never lands in
/// logs, error messages, or debug output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, e.g. "https://feed.example.com".
    /// Can be overridden with the --base-url flag.
    pub base_url: Option<String>,

    /// Posts per page for the pagination window.
    pub page_size: u32,

    /// Session token sent on every request (alternative to the
    /// GRAM_SESSION_TOKEN env var). Env var takes precedence.
    pub session_token: Option<String>,

    /// Theme variant name ("dark" or "light").
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            session_token: None,
            theme: "dark".to_string(),
        }
    }
}

/// Mask session_token in Debug output.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("theme", &self.theme)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading so a corrupted or hostile config
        // file cannot exhaust memory.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read.
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect unknown keys (typos).
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["base_url", "page_size", "session_token", "theme"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;

        if config.page_size == 0 {
            tracing::warn!(
                default = DEFAULT_PAGE_SIZE,
                "page_size of 0 is not usable, falling back to default"
            );
            config.page_size = DEFAULT_PAGE_SIZE;
        }

        tracing::info!(path = %path.display(), page_size = config.page_size, "Loaded configuration");
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.base_url.is_none());
        assert_eq!(config.page_size, 20);
        assert!(config.session_token.is_none());
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/gram_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("gram_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("gram_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "page_size = 10\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.theme, "dark"); // default
        assert!(config.base_url.is_none()); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("gram_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
base_url = "https://feed.example.com"
page_size = 25
session_token = "token-abc-123"
theme = "light"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://feed.example.com"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.session_token.as_deref(), Some("token-abc-123"));
        assert_eq!(config.theme, "light");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("gram_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = std::env::temp_dir().join("gram_config_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
theme = "dark"
totally_fake_key = "should not fail"
another_unknown = 42
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = std::env::temp_dir().join("gram_config_test_wrongtype");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        // page_size should be an integer, not a string
        std::fs::write(&path, "page_size = \"many\"\n").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = std::env::temp_dir().join("gram_config_test_whitespace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 20);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_page_size_falls_back_to_default() {
        let dir = std::env::temp_dir().join("gram_config_test_zero_page");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "page_size = 0\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 20);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("gram_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        // Just over 1MB.
        let content = "a".repeat(1_048_577);
        std::fs::write(&path, content).unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_at_size_limit_accepted() {
        let dir = std::env::temp_dir().join("gram_config_test_at_limit");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        // Valid TOML padded to exactly 1MB with comments.
        let mut content = "theme = \"dark\"\n".to_string();
        while content.len() < 1_048_576 - 20 {
            content.push_str("# padding comment\n");
        }
        content.truncate(1_048_576);
        std::fs::write(&path, &content).unwrap();

        let result = Config::load(&path);
        assert!(result.is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_masks_session_token() {
        let config = Config {
            session_token: Some("super-secret-token-12345".to_string()),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(
            !debug_output.contains("super-secret-token-12345"),
            "Debug output should not contain the session token"
        );
        assert!(
            debug_output.contains("[REDACTED]"),
            "Debug output should show [REDACTED] for the session token"
        );
    }

    #[test]
    fn test_debug_shows_none_when_no_token() {
        let config = Config::default();
        let debug_output = format!("{:?}", config);
        assert!(
            debug_output.contains("None"),
            "Debug output should show None when no token is set"
        );
        assert!(
            !debug_output.contains("[REDACTED]"),
            "Debug output should not show [REDACTED] when no token"
        );
    }
}
