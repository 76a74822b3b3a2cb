//! # Configuration Loading
//!
//! Reads an optional TOML file into a `FunnelConfig`, applies command-line
//! overrides, and validates the result. Missing keys keep their defaults.
//!
//! ```toml
//! destination_url = "https://example.com/offers/"
//! preloader_delay_ms = 3000
//! animation_delay_ms = 300
//! allowed_params = ["utm_source", "utm_medium", "gclid"]
//! ```

use funnel_core::{FunnelConfig, FunnelError};
use std::path::{Path, PathBuf};

/// Maximum config file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// Validate the config path: it must resolve to a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, FunnelError> {
    let canonical = path.canonicalize().map_err(|e| {
        FunnelError::IoError(format!("Invalid config path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FunnelError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Reject oversized files before reading them.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), FunnelError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| FunnelError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(FunnelError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Parse a TOML document into a configuration (not yet validated).
pub fn parse_config(content: &str) -> Result<FunnelConfig, FunnelError> {
    toml::from_str(content).map_err(|e| FunnelError::SerializationError(e.to_string()))
}

/// Load the configuration.
///
/// `path` is optional; without it the defaults are used. `destination`
/// overrides whatever the file says.
pub fn load_config(
    path: Option<&Path>,
    destination: Option<&str>,
) -> Result<FunnelConfig, FunnelError> {
    let mut config = match path {
        Some(path) => {
            let canonical = validate_file_path(path)?;
            validate_file_size(&canonical, MAX_CONFIG_FILE_SIZE)?;
            let content = std::fs::read_to_string(&canonical)
                .map_err(|e| FunnelError::IoError(format!("Cannot read config: {}", e)))?;
            tracing::debug!("Loaded configuration from {}", canonical.display());
            parse_config(&content)?
        }
        None => FunnelConfig::default(),
    };

    if let Some(destination) = destination {
        config.destination_url = destination.to_string();
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// TESTS
// =============================================================================
