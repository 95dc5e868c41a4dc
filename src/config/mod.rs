pub mod types;

use crate::error::{ConfigError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".policy-doctor.toml";

/// Get the global config file path (~/.policy-doctor.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Read and validate a config file.
pub fn read_config_file(path: &Path) -> Result<types::Config> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;
    let config: types::Config =
        toml::from_str(&content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &types::Config) -> std::result::Result<(), ConfigError> {
    if config.diagnosis.max_concurrent_fetches == 0 {
        return Err(ConfigError::InvalidValue {
            field: "diagnosis.max_concurrent_fetches".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if config.diagnosis.suggestion_server.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "diagnosis.suggestion_server".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Load configuration from file or use defaults
/// An explicit path must load; the global file is skipped with a warning if broken
pub fn load_config(explicit: Option<&Path>) -> Result<types::Config> {
    if let Some(path) = explicit {
        return read_config_file(path);
    }

    if let Some(global) = global_config_path() {
        if global.exists() {
            match read_config_file(&global) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Ignoring {}: {}", global.display(), e),
            }
        }
    }

    Ok(types::Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyDoctorError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = types::Config::default();
        assert_eq!(config.diagnosis.max_message_len, 300);
        assert_eq!(config.diagnosis.default_operator_namespace, "openshift-operators");
        assert_eq!(config.diagnosis.suggestion_server, "openshift-mcp-server");
        assert_eq!(config.diagnosis.max_concurrent_fetches, 4);
        assert_eq!(config.cluster.context, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("[diagnosis]\nmax_message_len = 120\n\n[cluster]\ncontext = \"hub\"\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.diagnosis.max_message_len, 120);
        assert_eq!(config.diagnosis.max_concurrent_fetches, 4);
        assert_eq!(config.cluster.context.as_deref(), Some("hub"));

        let settings = config.diagnosis.to_settings();
        assert_eq!(settings.max_message_len, 120);
        assert_eq!(settings.suggestions.server, "openshift-mcp-server");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/policy-doctor.toml"))).unwrap_err();
        assert!(matches!(err, PolicyDoctorError::Config(ConfigError::ReadFailed { .. })));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = write_config("[diagnosis\nmax_message_len = ");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, PolicyDoctorError::Config(ConfigError::ParsingFailed(_))));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let file = write_config("[diagnosis]\nmax_concurrent_fetches = 0\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("diagnosis.max_concurrent_fetches"));
    }
}
