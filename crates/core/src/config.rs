//! Client configuration loaded from the environment

use crate::errors::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_REFRESH_SKEW_SECS: u64 = 30;

/// When the session renews its access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Renew before every protected call, whatever the token's age.
    /// Concurrent calls may each renew.
    #[default]
    Always,
    /// Renew only when the access token expires within `skew`; concurrent
    /// callers share one in-flight renewal.
    OnExpiry { skew: Duration },
}

/// What the dashboard refetches after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// Only the aggregates and ledgers the mutation touches
    #[default]
    Targeted,
    /// Everything: every ledger is dropped, all aggregates refetched
    Full,
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, always ending in `/`
    pub api_url: String,
    pub request_timeout: Duration,
    pub refresh_policy: RefreshPolicy,
    pub reload_policy: ReloadPolicy,
    /// Directory holding the credential database
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh_policy: RefreshPolicy::Always,
            reload_policy: ReloadPolicy::Targeted,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from `BOXTRACK_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = match lookup("BOXTRACK_API_URL") {
            Some(url) => normalize_api_url(&url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout_secs = parse_or_default(&lookup, "BOXTRACK_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let skew_secs = parse_or_default(&lookup, "BOXTRACK_REFRESH_SKEW_SECS", DEFAULT_REFRESH_SKEW_SECS);

        let refresh_policy = match lookup("BOXTRACK_REFRESH_POLICY").as_deref().map(str::trim) {
            None | Some("") | Some("always") => RefreshPolicy::Always,
            Some("on-expiry") => RefreshPolicy::OnExpiry {
                skew: Duration::from_secs(skew_secs),
            },
            Some(other) => {
                return Err(Error::Config(format!(
                    "BOXTRACK_REFRESH_POLICY must be 'always' or 'on-expiry', got '{}'",
                    other
                )))
            }
        };

        let reload_policy = match lookup("BOXTRACK_RELOAD_POLICY").as_deref().map(str::trim) {
            None | Some("") | Some("targeted") => ReloadPolicy::Targeted,
            Some("full") => ReloadPolicy::Full,
            Some(other) => {
                return Err(Error::Config(format!(
                    "BOXTRACK_RELOAD_POLICY must be 'targeted' or 'full', got '{}'",
                    other
                )))
            }
        };

        let data_dir = lookup("BOXTRACK_DATA_DIR")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            refresh_policy,
            reload_policy,
            data_dir,
        })
    }

    /// Path of the credential database inside the data dir
    pub fn credentials_db_path(&self) -> PathBuf {
        self.data_dir.join("credentials.db")
    }
}

fn parse_or_default<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

/// Validate an absolute http(s) URL and make sure it ends in `/`
fn normalize_api_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("BOXTRACK_API_URL is not a valid URL: {}", e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::Config(format!(
            "BOXTRACK_API_URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    let mut normalized = url.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

fn default_data_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|p| p.join("boxtrack"))
        .unwrap_or_else(|| PathBuf::from(".boxtrack"))
}
