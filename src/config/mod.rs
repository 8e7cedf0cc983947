use crate::utils::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_memorylimit")]
    pub memorylimit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_verbosity")]
    pub verbosity: u8,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    11311
}

fn default_memorylimit() -> u64 {
    64
}

fn default_verbosity() -> u8 {
    1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            memorylimit: default_memorylimit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbosity: default_verbosity(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cache: CacheSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CacheError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CacheError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(CacheError::Config(
                "server.port must be nonzero".to_string(),
            ));
        }

        if self.cache.memorylimit == 0 {
            return Err(CacheError::Config(
                "cache.memorylimit must be greater than zero MiB".to_string(),
            ));
        }

        if self.logging.verbosity > 3 {
            return Err(CacheError::Config(format!(
                "logging.verbosity must be in 0..=3, got {}",
                self.logging.verbosity
            )));
        }

        Ok(())
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let example = r#"[server]
host = "127.0.0.1"
port = 11311

[cache]
memorylimit = 64  # MiB; hard limit, soft eviction kicks in at 75%

[logging]
verbosity = 1  # 0=error-only, 1=info, 2=debug, 3=trace
"#;

        std::fs::write(path.as_ref(), example)
            .map_err(|e| CacheError::Config(format!("Failed to write example config: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 11311);
        assert_eq!(config.cache.memorylimit, 64);
        assert_eq!(config.logging.verbosity, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.memorylimit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.verbosity = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ephemcache.toml");
        Config::create_example(&path).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 11311);
    }
}
