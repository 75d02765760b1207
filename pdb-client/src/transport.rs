use reqwest::blocking::Client;
use reqwest::{Certificate, Identity};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::errors::PdbError;
use crate::Result;

pub const USER_AGENT: &str = concat!("pdb-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Raw request/response exchange with a PuppetDB endpoint.
///
/// `path` is relative to the endpoint's versioned base path and may carry a
/// query string. Implementations return the body of a 2xx response and an
/// error for anything else, without retrying.
pub trait Transport {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<String>;

    fn get(&self, path: &str) -> Result<String> {
        self.request(Method::Get, path, None)
    }

    fn post(&self, path: &str, body: &Value) -> Result<String> {
        self.request(Method::Post, path, Some(body))
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<String> {
        (**self).request(method, path, body)
    }
}

/// Blocking HTTPS transport authenticating with a client certificate
pub struct HttpsTransport {
    client: Client,
    origin: String,
    base_path: String,
}

impl HttpsTransport {
    pub fn new(config: &Config, base_path: &str) -> Result<Self> {
        let client = build_client(config)?;
        let origin = format!("https://{}:{}", config.server.host, config.server.port);
        Ok(Self::with_client(client, origin, base_path))
    }

    pub(crate) fn with_client(client: Client, origin: String, base_path: &str) -> Self {
        Self {
            client,
            origin,
            base_path: base_path.to_string(),
        }
    }

    /// Paths starting with `?` address the base path itself
    pub fn url(&self, path: &str) -> String {
        let slash = if path.starts_with('?') { "" } else { "/" };
        format!("{}{}{}{}", self.origin, self.base_path, slash, path)
    }
}

impl Transport for HttpsTransport {
    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<String> {
        let url = self.url(path);
        tracing::debug!("{} {}", method.as_str(), url);

        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        }
        .header("Connection", "close")
        .header("Accept", "application/json");
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .json(body);
        }

        let response = request
            .send()
            .map_err(|e| PdbError::Transport(format!("Failed to {} {}: {}", method.as_str(), url, e)))?;

        let status_line = format!("{:?} {}", response.version(), response.status());
        let success = response.status().is_success();
        let body = response
            .text()
            .map_err(|e| PdbError::Transport(format!("Failed to read response body from {}: {}", url, e)))?;

        if !success {
            tracing::warn!("{} {} failed: {}", method.as_str(), url, status_line);
            return Err(PdbError::HttpStatus { status_line, body });
        }

        Ok(body)
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        PdbError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })
}

fn build_client(config: &Config) -> Result<Client> {
    let tls = &config.tls;

    let ca_pem = read_pem(&tls.ca_cert)?;
    let ca_certs = Certificate::from_pem_bundle(&ca_pem).map_err(|e| {
        PdbError::Configuration(format!("Invalid CA bundle {}: {}", tls.ca_cert.display(), e))
    })?;
    if ca_certs.is_empty() {
        return Err(PdbError::Configuration(format!(
            "No certificates found in CA bundle {}",
            tls.ca_cert.display()
        )));
    }

    let mut identity_pem = read_pem(&tls.client_cert)?;
    if let Some(key_path) = &tls.client_key {
        identity_pem.push(b'\n');
        identity_pem.extend(read_pem(key_path)?);
    }
    let identity = Identity::from_pem(&identity_pem).map_err(|e| {
        PdbError::Configuration(format!(
            "Invalid client certificate {}: {}",
            tls.client_cert.display(),
            e
        ))
    })?;

    let timeout = Duration::from_secs(config.timeout_seconds);
    let mut builder = Client::builder()
        .use_rustls_tls()
        .tls_built_in_root_certs(false)
        .identity(identity)
        .https_only(true)
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .timeout(timeout);
    for cert in ca_certs {
        builder = builder.add_root_certificate(cert);
    }

    builder
        .build()
        .map_err(|e| PdbError::Configuration(format!("Failed to build HTTP client: {}", e)))
}
