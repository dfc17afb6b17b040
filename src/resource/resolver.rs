//! Static resource resolution
//!
//! Requests are served straight from disk: the effective path of a request
//! is the root directory with the request host appended, without any
//! decoding. Failures fall back to the reserved `/404`, `/403` and `/index`
//! files in the root.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::http::request::{Method, ParsedRequest};
use crate::http::response::StatusCode;
use crate::resource::Resolution;
use crate::resource::cgi::CgiInvoker;

/// Hosts containing this marker are generated by the CGI interpreter.
pub const DYNAMIC_MARKER: &str = ".php";

const NOT_FOUND_PAGE: &str = "/404";
const FORBIDDEN_PAGE: &str = "/403";
const INDEX_PAGE: &str = "/index";

/// Returns `true` if the host names a dynamically generated page.
pub fn is_dynamic(host: &str) -> bool {
    host.contains(DYNAMIC_MARKER)
}

/// Resolves requests against a document root.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    root: String,
    cgi: CgiInvoker,
}

impl ResourceResolver {
    pub fn new(root: impl Into<String>, cgi: CgiInvoker) -> Self {
        Self {
            root: root.into(),
            cgi,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.root_directory.clone(),
            CgiInvoker::with_args(config.cgi_interpreter.clone(), config.cgi_args.clone()),
        )
    }

    /// Root directory concatenated with the request host.
    pub fn effective_path(&self, request: &ParsedRequest) -> PathBuf {
        PathBuf::from(format!("{}{}", self.root, request.host))
    }

    /// Applies the request method to the document root.
    ///
    /// `Err` is only returned for failures with no fallback page, such as
    /// a missing fallback file or an unexpected write error; the caller
    /// turns those into 500.
    pub async fn resolve(&self, request: &ParsedRequest) -> Result<Resolution> {
        match request.method {
            Some(Method::PUT) => self.store(request).await,
            Some(Method::DELETE) => self.remove(request).await,
            Some(Method::GET | Method::HEAD | Method::POST) if is_dynamic(&request.host) => {
                Ok(self.generate(request).await)
            }
            // scripts are never read back as files
            None if is_dynamic(&request.host) => {
                let body = self.read_page(INDEX_PAGE).await?;
                Ok(Resolution::ok(body))
            }
            _ => self.fetch(request).await,
        }
    }

    async fn store(&self, request: &ParsedRequest) -> Result<Resolution> {
        let path = self.effective_path(request);

        match tokio::fs::write(&path, &request.body).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                tracing::warn!(path = %path.display(), "Permission denied storing resource");
                return self.fallback(FORBIDDEN_PAGE, StatusCode::Forbidden).await;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to write {}", path.display()));
            }
        }

        let body = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to re-read {}", path.display()))?;

        tracing::info!(path = %path.display(), bytes = body.len(), "Resource stored");
        Ok(Resolution::with_status(body, StatusCode::Created))
    }

    async fn remove(&self, request: &ParsedRequest) -> Result<Resolution> {
        let path = self.effective_path(request);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::remove_file(&path)
                .await
                .with_context(|| format!("failed to delete {}", path.display()))?;
            tracing::info!(path = %path.display(), "Resource deleted");
        }

        Ok(Resolution::ok(Vec::new()))
    }

    async fn generate(&self, request: &ParsedRequest) -> Resolution {
        let script = format!("{}{}", self.root, request.host);

        match self.cgi.invoke(request, &script).await {
            Ok(body) => Resolution::ok(body),
            Err(e) => {
                tracing::error!(
                    script = %script,
                    error = %format!("{:#}", e),
                    "Dynamic content generation failed"
                );
                Resolution::fault()
            }
        }
    }

    async fn fetch(&self, request: &ParsedRequest) -> Result<Resolution> {
        let path = self.effective_path(request);

        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Resolution::ok(body)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                tracing::debug!(path = %path.display(), "Resource not found");
                self.fallback(NOT_FOUND_PAGE, StatusCode::NotFound).await
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                tracing::warn!(path = %path.display(), "Permission denied reading resource");
                self.fallback(FORBIDDEN_PAGE, StatusCode::Forbidden).await
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Serving index instead");
                let body = self.read_page(INDEX_PAGE).await?;
                Ok(Resolution::ok(body))
            }
        }
    }

    async fn fallback(&self, page: &str, status: StatusCode) -> Result<Resolution> {
        let body = self.read_page(page).await?;
        Ok(Resolution::with_status(body, status))
    }

    async fn read_page(&self, page: &str) -> Result<Vec<u8>> {
        let path = format!("{}{}", self.root, page);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read fallback page {}", path))
    }
}
