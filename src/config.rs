//! Service configuration, read from the environment.
//!
//! A `.env` file is loaded by the binary before [`Config::from_env`] runs.

use std::net::SocketAddr;
use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::optimizer::BidPolicy;

/// Full service configuration.
#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub policy: BidPolicy,
}

/// HTTP server settings.
#[derive(Debug)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
    /// Bearer token required on every route but `/health`. `None` disables auth.
    pub api_token: Option<SecretString>,
    /// Allowed browser origin. `None` allows any origin.
    pub cors_origin: Option<String>,
    /// Largest accepted upload.
    pub max_upload_bytes: usize,
    /// Reports kept for download before the oldest is evicted.
    pub max_stored_reports: usize,
    /// Seed the in-memory ads API with sample targets.
    pub demo_catalog: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            api_token: None,
            cors_origin: None,
            max_upload_bytes: 200 * 1024 * 1024, // 200 MB
            max_stored_reports: 100,
            demo_catalog: true,
        }
    }
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();
        let server = ServerConfig {
            bind_addr: parse_or(&lookup, "PPC_BIND_ADDR", defaults.bind_addr)?,
            api_token: non_empty(&lookup, "PPC_API_TOKEN").map(SecretString::from),
            cors_origin: non_empty(&lookup, "PPC_CORS_ORIGIN"),
            max_upload_bytes: parse_or(&lookup, "PPC_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_stored_reports: parse_or(
                &lookup,
                "PPC_MAX_STORED_REPORTS",
                defaults.max_stored_reports,
            )?,
            demo_catalog: parse_bool_or(&lookup, "PPC_DEMO_CATALOG", defaults.demo_catalog)?,
        };

        if server.max_stored_reports == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PPC_MAX_STORED_REPORTS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let base = BidPolicy::default();
        let policy = BidPolicy {
            min_bid: parse_or(&lookup, "PPC_MIN_BID", base.min_bid)?,
            max_increase: parse_or(&lookup, "PPC_MAX_INCREASE", base.max_increase)?,
            promising_increase: parse_or(
                &lookup,
                "PPC_PROMISING_INCREASE",
                base.promising_increase,
            )?,
            min_promising_ctr: parse_or(
                &lookup,
                "PPC_MIN_PROMISING_CTR",
                base.min_promising_ctr,
            )?,
            max_promising_spend_ratio: parse_or(
                &lookup,
                "PPC_MAX_PROMISING_SPEND_RATIO",
                base.max_promising_spend_ratio,
            )?,
        };
        policy.validate()?;

        Ok(Self { server, policy })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("'{}': {}", raw, e),
        }),
        None => Ok(default),
    }
}

fn parse_bool_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match non_empty(lookup, key) {
        Some(raw) => match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                reason: format!("'{}' is not a boolean", raw),
            }),
        },
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal_macros::dec;
    use secrecy::ExposeSecret;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.server.bind_addr.port(), 8000);
        assert!(cfg.server.api_token.is_none());
        assert_eq!(cfg.server.max_upload_bytes, 200 * 1024 * 1024);
        assert!(cfg.server.demo_catalog);
        assert_eq!(cfg.policy, BidPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PPC_BIND_ADDR", "127.0.0.1:9090"),
            ("PPC_API_TOKEN", "s3cret"),
            ("PPC_DEMO_CATALOG", "no"),
            ("PPC_MIN_BID", "0.05"),
            ("PPC_MAX_INCREASE", "0.1"),
        ])
        .unwrap();
        assert_eq!(cfg.server.bind_addr.to_string(), "127.0.0.1:9090");
        assert_eq!(
            cfg.server.api_token.as_ref().map(|t| t.expose_secret()),
            Some("s3cret")
        );
        assert!(!cfg.server.demo_catalog);
        assert_eq!(cfg.policy.min_bid, dec!(0.05));
        assert_eq!(cfg.policy.max_increase, dec!(0.1));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let cfg = config(&[("PPC_API_TOKEN", "  "), ("PPC_MIN_BID", "")]).unwrap();
        assert!(cfg.server.api_token.is_none());
        assert_eq!(cfg.policy.min_bid, dec!(0.02));
    }

    #[test]
    fn test_invalid_values_name_the_key() {
        let err = config(&[("PPC_MAX_STORED_REPORTS", "lots")]).unwrap_err();
        assert!(err.to_string().contains("PPC_MAX_STORED_REPORTS"));

        let err = config(&[("PPC_DEMO_CATALOG", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("PPC_DEMO_CATALOG"));
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let err = config(&[("PPC_MIN_BID", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Policy(_)));
    }
}
