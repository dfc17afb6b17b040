//! TLS policy
//!
//! TLS is used only when both a certificate and a private key are
//! configured. A certificate without a key is a startup error.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::{self, version};

use crate::config::Config;

/// Builds the acceptor for the configured credentials, if any.
pub fn acceptor(config: &Config) -> Result<Option<TlsAcceptor>> {
    match (&config.tls_cert, &config.tls_key) {
        (Some(cert), Some(key)) => {
            let server_config = server_config(cert, key)?;
            tracing::info!(cert = %cert.display(), "TLS enabled");
            Ok(Some(TlsAcceptor::from(Arc::new(server_config))))
        }
        (Some(cert), None) => {
            tracing::error!(cert = %cert.display(), "Missing private key");
            anyhow::bail!("missing private key for certificate {}", cert.display())
        }
        (None, Some(key)) => {
            tracing::warn!(key = %key.display(), "Private key given without certificate, serving plain TCP");
            Ok(None)
        }
        (None, None) => Ok(None),
    }
}

fn server_config(cert: &Path, key: &Path) -> Result<rustls::ServerConfig> {
    let certs = load_certs(cert)?;
    let key = load_key(key)?;

    // TLS 1.2 is the minimum accepted version
    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_protocol_versions(&[&version::TLS12, &version::TLS13])
    .context("unsupported TLS protocol versions")?
    .with_no_client_auth()
    .with_single_cert(certs, key)
    .context("invalid certificate or private key")?;

    Ok(config)
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open certificate {}", path.display()))?;

    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to parse certificate {}", path.display()))?;

    if certs.is_empty() {
        anyhow::bail!("no certificates found in {}", path.display());
    }

    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open private key {}", path.display()))?;

    rustls_pemfile::private_key(&mut BufReader::new(file))
        .with_context(|| format!("failed to parse private key {}", path.display()))?
        .with_context(|| format!("no private key found in {}", path.display()))
}
