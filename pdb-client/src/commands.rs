use serde_json::json;

use crate::config::Config;
use crate::errors::PdbError;
use crate::transport::{HttpsTransport, Transport};
use crate::Result;

/// Version of the `deactivate node` command wire format
const DEACTIVATE_NODE_VERSION: u8 = 3;

/// Write access through the PuppetDB command endpoint (v4 servers only)
pub struct PuppetDbCommands<T: Transport = HttpsTransport> {
    transport: T,
}

impl PuppetDbCommands<HttpsTransport> {
    pub fn new(config: &Config) -> Result<Self> {
        let version = config.server.api_version;
        let base_path = version.command_path().ok_or_else(|| {
            PdbError::Configuration(format!(
                "PuppetDB API version {} has no command endpoint",
                version
            ))
        })?;
        Ok(Self::with_transport(HttpsTransport::new(config, base_path)?))
    }
}

impl<T: Transport> PuppetDbCommands<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Mark a node as deactivated; returns the raw server acknowledgement
    pub fn deactivate(&self, node_name: &str) -> Result<String> {
        let path = format!(
            "?certname={}&command=deactivate_node&version={}",
            urlencoding::encode(node_name),
            DEACTIVATE_NODE_VERSION
        );
        let body = json!({
            "certname": node_name,
            "producer_timestamp": chrono::Utc::now().format("%Y-%m-%d").to_string(),
        });

        tracing::info!("Deactivating node {}", node_name);
        self.transport.post(&path, &body)
    }
}
