use anyhow::{Context, Result};
use pdb_query::ApiVersion;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::PdbError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub tls: TlsConfig,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_api_version")]
    pub api_version: ApiVersion,
    /// Identity the client certificate was issued to
    pub certname: String,
}

/// Resolved credential files. Nothing is discovered, all paths are explicit.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// CA bundle, the only trust root for the server certificate
    pub ca_cert: PathBuf,
    /// Client certificate, or certificate and key combined in one PEM file
    pub client_cert: PathBuf,
    /// Private key, when not part of `client_cert`
    pub client_key: Option<PathBuf>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Build a configuration from already resolved parameters, failing on an
    /// unknown API version.
    pub fn new(
        api_version: &str,
        certname: &str,
        host: &str,
        port: u16,
        tls: TlsConfig,
    ) -> std::result::Result<Self, PdbError> {
        let api_version: ApiVersion = api_version.parse()?;
        Ok(Config {
            server: ServerConfig {
                host: host.to_string(),
                port,
                api_version,
                certname: certname.to_string(),
            },
            tls,
            timeout_seconds: default_timeout(),
        })
    }
}

fn default_port() -> u16 {
    8081
}

fn default_api_version() -> ApiVersion {
    ApiVersion::V4
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tls() -> TlsConfig {
        TlsConfig {
            ca_cert: PathBuf::from("/ssl/certs/ca.pem"),
            client_cert: PathBuf::from("/ssl/private_keys/director_combined.pem"),
            client_key: None,
        }
    }

    #[test]
    fn test_load_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("puppetdb.toml");

        let config_content = r#"
timeout_seconds = 120

[server]
host = "puppetdb.example.com"
port = 8443
api_version = "v3"
certname = "director.example.com"

[tls]
ca_cert = "/etc/puppetdb/ssl/certs/ca.pem"
client_cert = "/etc/puppetdb/ssl/certs/director.pem"
client_key = "/etc/puppetdb/ssl/private_keys/director.pem"
"#;
        fs::write(&config_path, config_content).unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.server.host, "puppetdb.example.com");
        assert_eq!(config.server.port, 8443);
        assert_eq!(config.server.api_version, ApiVersion::V3);
        assert_eq!(config.server.certname, "director.example.com");
        assert_eq!(config.timeout_seconds, 120);
        assert_eq!(
            config.tls.client_key,
            Some(PathBuf::from("/etc/puppetdb/ssl/private_keys/director.pem"))
        );
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("puppetdb.toml");

        let config_content = r#"
[server]
host = "pe2015.example.com"
certname = "pe2015.example.com"

[tls]
ca_cert = "ssl/certs/ca.pem"
client_cert = "ssl/private_keys/pe2015.example.com_combined.pem"
"#;
        fs::write(&config_path, config_content).unwrap();

        let config = Config::load(&config_path).unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.api_version, ApiVersion::V4);
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.tls.client_key.is_none());
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("puppetdb.toml");

        let config_content = r#"
[server]
host = "pdb"
api_version = "v7"
certname = "pdb"

[tls]
ca_cert = "ca.pem"
client_cert = "client.pem"
"#;
        fs::write(&config_path, config_content).unwrap();

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("unknown PuppetDB API version: v7"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/puppetdb.toml"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file"));
    }

    #[test]
    fn test_new_parses_version() {
        let config = Config::new("v2", "director", "pdb.local", 8081, tls()).unwrap();
        assert_eq!(config.server.api_version, ApiVersion::V2);

        let err = Config::new("v0", "director", "pdb.local", 8081, tls()).unwrap_err();
        assert!(matches!(err, PdbError::Configuration(_)));
    }
}
