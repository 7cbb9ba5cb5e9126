//! Configuration management for the Meteosat skill
//!
//! Only host networking and logging are read from the environment; the
//! verification limits are fixed defaults that tests may override in code.

use crate::MeteosatError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration structure for the Meteosat skill
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillConfig {
    /// HTTP listener configuration
    pub server: ServerConfig,
    /// Request verification limits
    pub verification: VerificationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// PEM certificate served when TLS is enabled
    pub tls_cert_path: Option<PathBuf>,
    /// PEM private key served when TLS is enabled
    pub tls_key_path: Option<PathBuf>,
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Request verification limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Accepted distance between request timestamp and now
    #[serde(default = "default_timestamp_tolerance")]
    pub timestamp_tolerance_seconds: u32,
    /// Timeout for fetching the signing certificate chain
    #[serde(default = "default_cert_fetch_timeout")]
    pub cert_fetch_timeout_seconds: u32,
    /// How long a fetched chain is reused
    #[serde(default = "default_cert_cache_ttl")]
    pub cert_cache_ttl_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    10
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_timestamp_tolerance() -> u32 {
    150
}

fn default_cert_fetch_timeout() -> u32 {
    3
}

fn default_cert_cache_ttl() -> u32 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls_cert_path: None,
            tls_key_path: None,
            request_timeout_seconds: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            timestamp_tolerance_seconds: default_timestamp_tolerance(),
            cert_fetch_timeout_seconds: default_cert_fetch_timeout(),
            cert_cache_ttl_seconds: default_cert_cache_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// Certificate and key paths, when both are configured.
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert_path.as_ref().zip(self.tls_key_path.as_ref())
    }
}

impl SkillConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SkillConfig::default();

        if let Some(host) = lookup("METEOSAT_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("METEOSAT_PORT").or_else(|| lookup("PORT")) {
            config.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid port '{port}'"))?;
        }
        config.server.tls_cert_path = lookup("METEOSAT_TLS_CERT").map(PathBuf::from);
        config.server.tls_key_path = lookup("METEOSAT_TLS_KEY").map(PathBuf::from);

        if let Some(level) = lookup("METEOSAT_LOG_LEVEL") {
            config.logging.level = level.to_lowercase();
        }
        if let Some(format) = lookup("METEOSAT_LOG_FORMAT") {
            config.logging.format = format.to_lowercase();
        }

        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.max_body_bytes == 0 {
            self.server.max_body_bytes = default_max_body_bytes();
        }
        if self.verification.timestamp_tolerance_seconds == 0 {
            self.verification.timestamp_tolerance_seconds = default_timestamp_tolerance();
        }
        if self.verification.cert_fetch_timeout_seconds == 0 {
            self.verification.cert_fetch_timeout_seconds = default_cert_fetch_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(MeteosatError::config("Port must be between 1 and 65535").into());
        }

        if self.verification.timestamp_tolerance_seconds > 150 {
            return Err(
                MeteosatError::config("Timestamp tolerance cannot exceed 150 seconds").into(),
            );
        }

        if self.verification.cert_fetch_timeout_seconds > 10 {
            return Err(
                MeteosatError::config("Certificate fetch timeout cannot exceed 10 seconds").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(MeteosatError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(MeteosatError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        self.server.socket_addr()?;
        Ok(())
    }

    fn validate_tls(&self) -> Result<()> {
        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(MeteosatError::config(
                "METEOSAT_TLS_CERT and METEOSAT_TLS_KEY must be set together",
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<SkillConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SkillConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = SkillConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.verification.timestamp_tolerance_seconds, 150);
        assert_eq!(config.verification.cert_fetch_timeout_seconds, 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.server.tls_paths().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_port_fallback_and_override() {
        assert_eq!(load(&[("PORT", "9000")]).unwrap().server.port, 9000);
        let config = load(&[("PORT", "9000"), ("METEOSAT_PORT", "9443")]).unwrap();
        assert_eq!(config.server.port, 9443);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("METEOSAT_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("Invalid port"));
        assert!(load(&[("METEOSAT_PORT", "0")]).is_err());
    }

    #[test]
    fn test_tls_requires_both_paths() {
        let err = load(&[("METEOSAT_TLS_CERT", "/etc/skill/cert.pem")]).unwrap_err();
        assert!(err.to_string().contains("must be set together"));

        let config = load(&[
            ("METEOSAT_TLS_CERT", "/etc/skill/cert.pem"),
            ("METEOSAT_TLS_KEY", "/etc/skill/key.pem"),
        ])
        .unwrap();
        assert!(config.server.tls_paths().is_some());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let err = load(&[("METEOSAT_LOG_LEVEL", "loud")]).unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = SkillConfig::default();
        config.verification.timestamp_tolerance_seconds = 600;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("cannot exceed 150"));
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = SkillConfig::default();
        config.verification.timestamp_tolerance_seconds = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.verification.timestamp_tolerance_seconds, 150);
        assert_eq!(config.logging.format, "pretty");
    }
}
