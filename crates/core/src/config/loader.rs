use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;
use tracing::info;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// A missing file is not an error: defaults plus environment apply.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        info!("Config file {:?} not found, using defaults", path);
    }

    figment
        .merge(Env::prefixed("CINERANK_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_load_config_from_str_invalid_type() {
        let toml = r#"
[server]
port = "not-a-port"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.availability.checkpoint_interval, 50);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[availability]
country = "IT"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.availability.country, "IT");
    }
}
