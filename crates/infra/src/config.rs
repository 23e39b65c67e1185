//! Configuration loading and representation.
//!
//! Everything is read from the process environment (`.env` is loaded by the
//! binary). Unset keys fall back to defaults; set-but-invalid keys are errors.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::retry::RetryPolicy;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key} ({value:?}): {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Stock ledger tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    pub default_low_stock_threshold: i64,
    pub retry: RetryPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_low_stock_threshold: 5,
            retry: RetryPolicy::default(),
        }
    }
}

/// Reconciliation batch tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// Upper bound on upload + cover write for a single file.
    pub per_file_timeout: Duration,
    pub cover_path_prefix: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            per_file_timeout: Duration::from_secs(30),
            cover_path_prefix: "covers".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` means "not configured"; the binary decides whether that is fatal.
    pub jwt_secret: Option<String>,
    pub blob_public_base_url: String,
    pub ledger: LedgerConfig,
    pub reconcile: ReconcileConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: None,
            blob_public_base_url: "memory://blobs".to_string(),
            ledger: LedgerConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_attempts: u32 = parse_or(&lookup, "LEDGER_MAX_ATTEMPTS", defaults.ledger.retry.max_attempts)?;
        if max_attempts == 0 {
            return Err(invalid("LEDGER_MAX_ATTEMPTS", "0", "must be at least 1"));
        }
        let base_ms: u64 = parse_or(
            &lookup,
            "LEDGER_BACKOFF_BASE_MS",
            defaults.ledger.retry.base_delay.as_millis() as u64,
        )?;
        let max_ms: u64 = parse_or(
            &lookup,
            "LEDGER_BACKOFF_MAX_MS",
            defaults.ledger.retry.max_delay.as_millis() as u64,
        )?;
        if max_ms < base_ms {
            return Err(invalid(
                "LEDGER_BACKOFF_MAX_MS",
                &max_ms.to_string(),
                "must not be smaller than LEDGER_BACKOFF_BASE_MS",
            ));
        }

        let threshold: i64 = parse_or(
            &lookup,
            "LOW_STOCK_THRESHOLD",
            defaults.ledger.default_low_stock_threshold,
        )?;
        if threshold < 0 {
            return Err(invalid("LOW_STOCK_THRESHOLD", &threshold.to_string(), "must be non-negative"));
        }

        let timeout_secs: u64 = parse_or(
            &lookup,
            "RECONCILE_FILE_TIMEOUT_SECS",
            defaults.reconcile.per_file_timeout.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(invalid("RECONCILE_FILE_TIMEOUT_SECS", "0", "must be positive"));
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            blob_public_base_url: lookup("BLOB_PUBLIC_BASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.blob_public_base_url),
            ledger: LedgerConfig {
                default_low_stock_threshold: threshold,
                retry: RetryPolicy::exponential(
                    max_attempts,
                    Duration::from_millis(base_ms),
                    Duration::from_millis(max_ms),
                ),
            },
            reconcile: ReconcileConfig {
                per_file_timeout: Duration::from_secs(timeout_secs),
                cover_path_prefix: lookup("COVER_PATH_PREFIX")
                    .map(|s| s.trim().trim_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or(defaults.reconcile.cover_path_prefix),
            },
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, e.to_string())),
    }
}
