use crate::core::archive::{ArchiveOptions, MAX_COMPRESSION_LEVEL};
use crate::core::ConfigProvider;
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub project_name: String,
    pub page_title: String,
    pub archive_filename: String,
    pub temp_prefix: String,
    pub temp_root: Option<PathBuf>,
    pub compression_level: i64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            project_name: "exported-react-tailwind-project".to_string(),
            page_title: "Exported Layout".to_string(),
            archive_filename: "react-tailwind-project.zip".to_string(),
            temp_prefix: "export-demo-".to_string(),
            temp_root: None,
            compression_level: MAX_COMPRESSION_LEVEL,
        }
    }
}

impl ConfigProvider for ExportConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn page_title(&self) -> &str {
        &self.page_title
    }

    fn temp_root(&self) -> Option<&Path> {
        self.temp_root.as_deref()
    }

    fn temp_prefix(&self) -> &str {
        &self.temp_prefix
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub verbose: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ExportError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ExportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ExportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            compression_level: self.export.compression_level,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_positive_number("server.port", self.server.port as usize, 1)?;

        validation::validate_origin("cors.allowed_origin", &self.cors.allowed_origin)?;

        validation::validate_non_empty_string("export.project_name", &self.export.project_name)?;
        validation::validate_non_empty_string("export.page_title", &self.export.page_title)?;
        validation::validate_file_name("export.archive_filename", &self.export.archive_filename)?;
        validation::validate_file_extension("export.archive_filename", &self.export.archive_filename, &["zip"])?;
        validation::validate_file_name("export.temp_prefix", &self.export.temp_prefix)?;
        if let Some(temp_root) = &self.export.temp_root {
            validation::validate_directory("export.temp_root", temp_root)?;
        }
        validation::validate_range(
            "export.compression_level",
            self.export.compression_level,
            0,
            MAX_COMPRESSION_LEVEL,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.socket_addr(), "127.0.0.1:3001");
        assert_eq!(config.cors.allowed_origin, "http://localhost:3000");
        assert_eq!(config.export.archive_filename, "react-tailwind-project.zip");
        assert_eq!(config.export.compression_level, 9);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config = TomlConfig::from_toml_str(
            r#"
            [server]
            port = 8080

            [export]
            project_name = "my-layout"
            temp_root = "/var/tmp"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.export.project_name(), "my-layout");
        assert_eq!(config.export.temp_root(), Some(Path::new("/var/tmp")));
        assert_eq!(config.export.temp_prefix(), "export-demo-");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("LAYOUT_EXPORT_TEST_ORIGIN", "https://builder.example.com");
        let config = TomlConfig::from_toml_str(
            r#"
            [cors]
            allowed_origin = "${LAYOUT_EXPORT_TEST_ORIGIN}"
            "#,
        )
        .unwrap();
        assert_eq!(config.cors.allowed_origin, "https://builder.example.com");
    }

    #[test]
    fn test_unknown_env_var_is_kept() {
        let config = TomlConfig::from_toml_str(
            r#"
            [export]
            page_title = "${LAYOUT_EXPORT_TEST_UNSET_VARIABLE}"
            "#,
        )
        .unwrap();
        assert_eq!(config.export.page_title, "${LAYOUT_EXPORT_TEST_UNSET_VARIABLE}");
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let mut config = TomlConfig::default();
        config.cors.allowed_origin = "localhost:3000".to_string();
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.export.compression_level = 12;
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.export.archive_filename = "project.tar".to_string();
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.export.temp_prefix = "../escape".to_string();
        assert!(config.validate().is_err());

        let mut config = TomlConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compression_level_bounds() {
        let mut config = TomlConfig::default();
        config.export.compression_level = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.archive_options().compression_level, 0);

        config.export.compression_level = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temp_root_must_be_existing_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        let mut config = TomlConfig::default();
        config.export.temp_root = Some(temp_dir.path().to_path_buf());
        assert!(config.validate().is_ok());

        config.export.temp_root = Some(temp_dir.path().join("not-created"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfigValueError { ref field, .. } if field == "export.temp_root"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = TomlConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert_eq!(err.kind(), crate::utils::error::ErrorKind::Config);
    }

    #[test]
    fn test_missing_file() {
        let err = TomlConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ExportError::ConfigError { .. }));
    }
}
