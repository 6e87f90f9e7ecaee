// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the client. Configuration is loaded from the environment by
//! [`ClientConfig::from_env`]; the CLI lets flags override it.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `NEBULAS_API_URL` | Base URL of the Nebulas node API | `https://testnet.nebulas.io` |
//! | `NEBULAS_DEBUG` | Log raw request URLs and response bodies at `info` | `false` |
//! | `NEBULAS_TIMEOUT_SECS` | Per-request timeout in seconds | `15` |
//! | `NEBULAS_NONCE_DRIFT_WARN` | Local-over-chain nonce lead that triggers a warning | `16` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,nebulas_client=debug` |

use std::env;
use std::time::Duration;

use url::Url;

use crate::blockchain::NetworkConfig;
use crate::error::NebClientError;

/// Environment variable name for the node API base URL.
pub const API_URL_ENV: &str = "NEBULAS_API_URL";

/// Environment variable name for the raw traffic logging switch.
pub const DEBUG_ENV: &str = "NEBULAS_DEBUG";

/// Environment variable name for the per-request timeout.
pub const TIMEOUT_SECS_ENV: &str = "NEBULAS_TIMEOUT_SECS";

/// Environment variable name for the nonce drift warning threshold.
///
/// When the locally recorded nonce is ahead of the chain by more than this,
/// nonce reconciliation still trusts the local value but logs a warning.
pub const NONCE_DRIFT_WARN_ENV: &str = "NEBULAS_NONCE_DRIFT_WARN";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_API_URL: &str = "https://testnet.nebulas.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_NONCE_DRIFT_WARN: u64 = 16;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; anything other than `json` means pretty output.
    pub fn from_env() -> Self {
        Self::parse(env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Settings for [`crate::blockchain::NebClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Node API base URL
    pub base_url: Url,
    /// Log raw traffic at `info` instead of `trace`
    pub debug: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Local nonce lead that triggers a drift warning
    pub nonce_drift_warn: u64,
}

impl ClientConfig {
    /// Configuration for the given base URL with default settings.
    pub fn new(base_url: &str) -> Result<Self, NebClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            debug: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            nonce_drift_warn: DEFAULT_NONCE_DRIFT_WARN,
        })
    }

    /// Configuration pointing at a network preset.
    pub fn for_network(network: &NetworkConfig) -> Result<Self, NebClientError> {
        Self::new(network.api_url)
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, NebClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NebClientError> {
        let base_url = lookup(API_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let mut config = Self::new(&base_url)?;
        if let Some(raw) = lookup(DEBUG_ENV) {
            config.debug = parse_bool(&raw);
        }
        if let Some(raw) = lookup(TIMEOUT_SECS_ENV) {
            config.timeout = Duration::from_secs(parse_u64(TIMEOUT_SECS_ENV, &raw)?);
        }
        if let Some(raw) = lookup(NONCE_DRIFT_WARN_ENV) {
            config.nonce_drift_warn = parse_u64(NONCE_DRIFT_WARN_ENV, &raw)?;
        }
        Ok(config)
    }

    /// Point at another node, keeping the remaining settings.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, NebClientError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_nonce_drift_warn(mut self, threshold: u64) -> Self {
        self.nonce_drift_warn = threshold;
        self
    }

    /// Full URL for an API path such as `/v1/user/nebstate`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_base_url(raw: &str) -> Result<Url, NebClientError> {
    let url = Url::parse(raw.trim()).map_err(|e| NebClientError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(NebClientError::InvalidUrl(format!(
            "{raw}: unsupported scheme `{other}`"
        ))),
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, NebClientError> {
    raw.trim()
        .parse()
        .map_err(|e| NebClientError::Config(format!("{name}={raw}: {e}")))
}
