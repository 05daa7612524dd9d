//! Mutual TLS material for the Loggregator agent connection.
//!
//! Loads the CA bundle, client certificate and private key from PEM files
//! and checks that each actually contains what it should before handing
//! them to tonic.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tonic::transport::{Certificate, ClientTlsConfig, Identity};
use tracing::debug;

use crate::error::EgressError;

/// Server name the Loggregator agent presents in its certificate.
pub const AGENT_SERVER_NAME: &str = "metron";

/// PEM-encoded credentials for the ingress connection.
#[derive(Debug, Clone)]
pub struct IngressTlsConfig {
    ca_pem: String,
    cert_pem: String,
    key_pem: String,
    server_name: String,
}

impl IngressTlsConfig {
    /// Read and validate the CA, certificate and key files.
    pub fn load(ca_path: &Path, cert_path: &Path, key_path: &Path) -> Result<Self, EgressError> {
        let ca_pem = read_pem(ca_path)?;
        ensure_certificates(ca_path, &ca_pem)?;

        let cert_pem = read_pem(cert_path)?;
        ensure_certificates(cert_path, &cert_pem)?;

        let key_pem = read_pem(key_path)?;
        ensure_private_key(key_path, &key_pem)?;

        debug!(ca = ?ca_path, cert = ?cert_path, key = ?key_path, "ingress TLS material loaded");

        Ok(Self {
            ca_pem,
            cert_pem,
            key_pem,
            server_name: AGENT_SERVER_NAME.to_string(),
        })
    }

    /// Override the expected server name.
    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = server_name.into();
        self
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Build the tonic client TLS configuration.
    pub fn client_config(&self) -> ClientTlsConfig {
        ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(&self.ca_pem))
            .identity(Identity::from_pem(&self.cert_pem, &self.key_pem))
            .domain_name(self.server_name.clone())
    }
}

fn read_pem(path: &Path) -> Result<String, EgressError> {
    fs::read_to_string(path).map_err(|e| tls_error(path, e.to_string()))
}

fn ensure_certificates(path: &Path, pem: &str) -> Result<(), EgressError> {
    let mut reader = BufReader::new(pem.as_bytes());
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| tls_error(path, e.to_string()))?;
    if certs.is_empty() {
        return Err(tls_error(path, "no certificates found".to_string()));
    }
    Ok(())
}

fn ensure_private_key(path: &Path, pem: &str) -> Result<(), EgressError> {
    let mut reader = BufReader::new(pem.as_bytes());
    match rustls_pemfile::private_key(&mut reader) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(tls_error(path, "no private key found".to_string())),
        Err(e) => Err(tls_error(path, e.to_string())),
    }
}

fn tls_error(path: &Path, reason: String) -> EgressError {
    EgressError::Tls {
        path: PathBuf::from(path),
        reason,
    }
}
