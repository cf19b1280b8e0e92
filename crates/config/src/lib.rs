//! packetmap Configuration Management
//!
//! Loads the protocol layer's settings from a `key = value` file.
//!
//! ```text
//! # packetmap.conf
//! mappings = data/mappings.json.gz
//! tolerate_unknown = particle_type, entity_type
//! default_version = 1.20.5
//! log_level = debug
//! ```

use packetmap_core::{ClientVersion, ProtocolError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up by [`ProtocolConfig::load_default`]
pub const DEFAULT_CONFIG_FILE: &str = "packetmap.conf";

/// Protocol layer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolConfig {
    /// External mapping bundle (from "mappings" option); bundled data when unset
    pub mappings: Option<PathBuf>,
    /// Registries whose diffs may name undeclared identifiers (from "tolerate_unknown" option)
    pub tolerate_unknown: Vec<String>,
    /// Version assumed when none is given (from "default_version" option)
    pub default_version: ClientVersion,
    /// Log filter when RUST_LOG is unset (from "log_level" option)
    pub log_level: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            mappings: None,
            tolerate_unknown: Vec::new(),
            default_version: ClientVersion::latest(),
            log_level: "info".to_string(),
        }
    }
}

impl ProtocolConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Load `packetmap.conf` from the working directory, defaults if absent
    pub fn load_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration content
    ///
    /// Unknown keys are ignored, unparsable values keep their default.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                config.parse_option(key.trim(), value.trim());
            }
        }

        config
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key {
            "mappings" => {
                self.mappings = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "tolerate_unknown" => {
                self.tolerate_unknown = value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect();
            }
            "default_version" => match value.parse() {
                Ok(version) => self.default_version = version,
                Err(_) => {
                    tracing::warn!("Ignoring unknown default_version '{}'", value);
                }
            },
            "log_level" => {
                if value.is_empty() {
                    tracing::warn!("Ignoring empty log_level");
                } else {
                    self.log_level = value.to_string();
                }
            }
            _ => {}
        }
    }

    pub fn tolerates_unknown(&self, registry: &str) -> bool {
        self.tolerate_unknown.iter().any(|name| name == registry)
    }

    /// Resolve an optional version argument against the default
    pub fn version_or_default(&self, version: Option<&str>) -> Result<ClientVersion> {
        match version {
            Some(name) => name
                .parse()
                .map_err(|_| ProtocolError::Config(format!("Unknown client version '{}'", name))),
            None => Ok(self.default_version),
        }
    }

    pub fn display(&self) {
        tracing::info!("Protocol configuration:");
        match &self.mappings {
            Some(path) => tracing::info!("  Mappings: {}", path.display()),
            None => tracing::info!("  Mappings: bundled"),
        }
        if self.tolerate_unknown.is_empty() {
            tracing::info!("  Tolerate unknown: none");
        } else {
            tracing::info!("  Tolerate unknown: {}", self.tolerate_unknown.join(", "));
        }
        tracing::info!("  Default version: {}", self.default_version);
        tracing::info!("  Log level: {}", self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ProtocolConfig::default();
        assert_eq!(config.mappings, None);
        assert_eq!(config.default_version, ClientVersion::latest());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_parse_simple_config() {
        let config_text = r#"
# comment
mappings = /opt/mappings.json
tolerate_unknown = particle_type, entity_type,
default_version = 1.16.5
log_level = debug
unknown_key = whatever
"#;
        let config = ProtocolConfig::parse(config_text);
        assert_eq!(config.mappings, Some(PathBuf::from("/opt/mappings.json")));
        assert_eq!(config.tolerate_unknown, vec!["particle_type", "entity_type"]);
        assert!(config.tolerates_unknown("entity_type"));
        assert!(!config.tolerates_unknown("argument_type"));
        assert_eq!(config.default_version, ClientVersion::V1_16_4);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = ProtocolConfig::parse("default_version = 9.9\nlog_level =\nno equals sign");
        assert_eq!(config, ProtocolConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_version = 1.8").unwrap();
        let config = ProtocolConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.default_version, ClientVersion::V1_8);

        assert!(matches!(
            ProtocolConfig::load_from_file("/nonexistent/packetmap.conf"),
            Err(ProtocolError::Io(_))
        ));
    }

    #[test]
    fn test_version_or_default() {
        let config = ProtocolConfig::parse("default_version = 1.12.2");
        assert_eq!(config.version_or_default(None).unwrap(), ClientVersion::V1_12_2);
        assert_eq!(config.version_or_default(Some("1.20.4")).unwrap(), ClientVersion::V1_20_3);
        assert!(matches!(
            config.version_or_default(Some("2.0")),
            Err(ProtocolError::Config(_))
        ));
    }
}
