// ABOUTME: Configuration loading and validation for the petstore command-line tool.
// ABOUTME: Reads PETSTORE_* environment variables and derives the store file location.

use std::path::PathBuf;

use petstore_core::contract::{DATABASE_NAME, DEFAULT_AUTHORITY};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PETSTORE_AUTHORITY must be non-empty and contain no '/': {0:?}")]
    InvalidAuthority(String),
}

/// Tool configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PetstoreConfig {
    pub home: PathBuf,
    pub authority: String,
}

impl PetstoreConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - PETSTORE_HOME: data directory (default: ~/.petstore)
    /// - PETSTORE_AUTHORITY: authority of resource URIs (default: com.example.android.pets)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("PETSTORE_HOME")
            .ok()
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".petstore")
            });

        let authority = std::env::var("PETSTORE_AUTHORITY")
            .unwrap_or_else(|_| DEFAULT_AUTHORITY.to_string());
        if authority.is_empty() || authority.contains('/') {
            return Err(ConfigError::InvalidAuthority(authority));
        }

        Ok(Self { home, authority })
    }

    /// Path of the store file inside the home directory.
    pub fn database_path(&self) -> PathBuf {
        self.home.join(DATABASE_NAME)
    }
}
