use crate::config::types::{
    Config, DownloadConfig, FetchConfig, FetchStrategyKind, OutputConfig,
};
use crate::{ConfigError, ConfigResult};

/// Upper bound on the per-request timeout (seconds)
const MAX_TIMEOUT_SECS: u64 = 600;

/// Upper bound on followed redirects
const MAX_REDIRECTS: usize = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    validate_download_config(&config.download)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    if config.timeout_secs < 1 || config.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be between 1 and {}, got {}",
            MAX_TIMEOUT_SECS, config.connect_timeout_secs
        )));
    }

    if config.max_redirects > MAX_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= {}, got {}",
            MAX_REDIRECTS, config.max_redirects
        )));
    }

    validate_user_agent(&config.user_agent)?;

    if config.strategy == FetchStrategyKind::Browser && !cfg!(feature = "browser") {
        return Err(ConfigError::Validation(
            "strategy = \"browser\" requires link-sieve to be built with the `browser` feature"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validates a User-Agent header value
fn validate_user_agent(user_agent: &str) -> ConfigResult<()> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    // Header values may not carry control characters
    if user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user-agent contains control characters: {:?}",
            user_agent
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates downloader configuration
fn validate_download_config(config: &DownloadConfig) -> ConfigResult<()> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "download directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(validate(&config).is_err());

        config.fetch.timeout_secs = 1;
        assert!(validate(&config).is_ok());

        config.fetch.timeout_secs = MAX_TIMEOUT_SECS + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_max_redirects() {
        let mut config = Config::default();
        config.fetch.max_redirects = 0;
        assert!(validate(&config).is_ok());

        config.fetch.max_redirects = MAX_REDIRECTS + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_user_agent() {
        assert!(validate_user_agent("Mozilla/5.0 (X11; Linux x86_64)").is_ok());

        assert!(validate_user_agent("").is_err());
        assert!(validate_user_agent("   ").is_err());
        assert!(validate_user_agent("bad\nagent").is_err());
    }

    #[test]
    fn test_validate_empty_directories() {
        let mut config = Config::default();
        config.output.directory.clear();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.download.directory.clear();
        assert!(validate(&config).is_err());
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn test_browser_strategy_requires_feature() {
        let mut config = Config::default();
        config.fetch.strategy = FetchStrategyKind::Browser;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
