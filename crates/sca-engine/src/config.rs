//! Environment-driven gateway configuration.

use url::Url;

use crate::retry::DEFAULT_MAX_RETRIES;

/// NAICS codes the restriction overlay screens for when no override is
/// configured.
pub const DEFAULT_RESTRICTED_CODES: [&str; 3] = ["6531", "7371", "3579"];

/// Default per-request timeout for remote engine calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL in {var}: {source}")]
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("{var} is required when SCA_USE_REMOTE is enabled")]
    MissingVar { var: &'static str },
}

/// Gateway configuration. Defaults to local-only evaluation with the
/// standing restricted-industry screen enabled.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Route evaluation to a remote rule engine when one is configured.
    pub use_remote: bool,
    /// Base URL of the remote rule engine.
    pub remote_url: Option<Url>,
    /// Per-request timeout for remote calls.
    pub timeout_secs: u64,
    /// Transport-level retries after the initial remote request.
    pub max_retries: u32,
    /// NAICS codes screened by the restriction overlay.
    pub restricted_codes: Vec<String>,
    /// Whether the restriction overlay runs at all.
    pub restriction_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            use_remote: false,
            remote_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            restricted_codes: DEFAULT_RESTRICTED_CODES
                .iter()
                .map(|c| (*c).to_owned())
                .collect(),
            restriction_enabled: true,
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the environment.
    ///
    /// Variables: `SCA_USE_REMOTE`, `SCA_RULE_ENGINE_URL`,
    /// `SCA_TIMEOUT_SECS`, `SCA_MAX_RETRIES`, `SCA_RESTRICTED_CODES`
    /// (comma-separated), `SCA_RESTRICTION_ENABLED`. Unset variables fall
    /// back to defaults; a set-but-malformed variable is an error, not a
    /// silent default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = env_var("SCA_USE_REMOTE") {
            config.use_remote = parse_bool("SCA_USE_REMOTE", &value)?;
        }
        if let Some(value) = env_var("SCA_RULE_ENGINE_URL") {
            let url = Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
                var: "SCA_RULE_ENGINE_URL",
                source,
            })?;
            config.remote_url = Some(url);
        }
        if let Some(value) = env_var("SCA_TIMEOUT_SECS") {
            config.timeout_secs =
                value
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        var: "SCA_TIMEOUT_SECS",
                        value,
                    })?;
        }
        if let Some(value) = env_var("SCA_MAX_RETRIES") {
            config.max_retries =
                value
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidValue {
                        var: "SCA_MAX_RETRIES",
                        value,
                    })?;
        }
        if let Some(value) = env_var("SCA_RESTRICTED_CODES") {
            config.restricted_codes = value
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_owned)
                .collect();
        }
        if let Some(value) = env_var("SCA_RESTRICTION_ENABLED") {
            config.restriction_enabled = parse_bool("SCA_RESTRICTION_ENABLED", &value)?;
        }

        if config.use_remote && config.remote_url.is_none() {
            return Err(ConfigError::MissingVar {
                var: "SCA_RULE_ENGINE_URL",
            });
        }

        Ok(config)
    }
}

fn env_var(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_owned(),
        }),
    }
}
