//! CGI invocation
//!
//! Dynamic pages are produced by an external CGI-compatible interpreter.
//! Every invocation gets its own [`CgiEnvironment`], applied to the child
//! process only, so concurrent requests never see each other's variables.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::http::request::{Method, ParsedRequest};

const GATEWAY_INTERFACE: &str = "CGI/1.1";
const SERVER_PROTOCOL: &str = "HTTP/1.1";
const REMOTE_HOST: &str = "127.0.0.1";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Variables and stdin for a single interpreter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiEnvironment {
    vars: Vec<(&'static str, String)>,
    stdin: Option<Vec<u8>>,
}

impl CgiEnvironment {
    /// Builds the environment for `request` running `script`.
    ///
    /// Returns `None` for methods that have no CGI mapping.
    pub fn for_request(request: &ParsedRequest, script: &str) -> Option<Self> {
        match request.method? {
            method @ (Method::GET | Method::HEAD) => Some(Self {
                vars: vec![
                    ("QUERY_STRING", request.query.clone()),
                    ("SCRIPT_FILENAME", script.to_string()),
                    ("REQUEST_METHOD", method.as_str().to_string()),
                    ("REDIRECT_STATUS", "0".to_string()),
                ],
                stdin: None,
            }),
            Method::POST => Some(Self {
                vars: vec![
                    ("GATEWAY_INTERFACE", GATEWAY_INTERFACE.to_string()),
                    ("SCRIPT_FILENAME", script.to_string()),
                    ("REQUEST_METHOD", Method::POST.as_str().to_string()),
                    ("SERVER_PROTOCOL", SERVER_PROTOCOL.to_string()),
                    ("REMOTE_HOST", REMOTE_HOST.to_string()),
                    ("CONTENT_TYPE", FORM_CONTENT_TYPE.to_string()),
                    ("CONTENT_LENGTH", request.body.len().to_string()),
                ],
                stdin: Some(request.body.clone()),
            }),
            Method::PUT | Method::DELETE => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn vars(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.vars.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn stdin(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }
}

/// Runs the configured interpreter for dynamic pages.
#[derive(Debug, Clone)]
pub struct CgiInvoker {
    interpreter: String,
    args: Vec<String>,
}

impl CgiInvoker {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self::with_args(interpreter, Vec::new())
    }

    /// An interpreter run with fixed leading arguments.
    pub fn with_args(interpreter: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            args,
        }
    }

    /// Runs `script` for `request` and returns the output body, with the
    /// interpreter's header block removed.
    pub async fn invoke(&self, request: &ParsedRequest, script: &str) -> Result<Vec<u8>> {
        let env = CgiEnvironment::for_request(request, script)
            .with_context(|| format!("no CGI mapping for {:?}", request.method))?;

        let mut command = Command::new(&self.interpreter);
        command
            .args(&self.args)
            .envs(env.vars())
            .stdin(if env.stdin().is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            interpreter = %self.interpreter,
            script = %script,
            method = ?request.method,
            "Invoking CGI interpreter"
        );

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.interpreter))?;

        if let (Some(body), Some(mut stdin)) = (env.stdin(), child.stdin.take()) {
            match stdin.write_all(body).await {
                Ok(()) => {}
                // the script is free to ignore its input
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e).context("failed to write request body to interpreter"),
            }
        }

        let output = child
            .wait_with_output()
            .await
            .context("failed to collect interpreter output")?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                self.interpreter,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(strip_cgi_headers(&output.stdout).to_vec())
    }
}

/// Returns everything after the first blank line of CGI output, or the
/// whole output if it has no header block.
pub fn strip_cgi_headers(output: &[u8]) -> &[u8] {
    output
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map_or(output, |end| &output[end + 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_header_block() {
        let output = b"X-Powered-By: PHP\r\nContent-type: text/html\r\n\r\n<p>hi</p>";
        assert_eq!(strip_cgi_headers(output), b"<p>hi</p>");
    }

    #[test]
    fn output_without_headers_is_kept() {
        assert_eq!(strip_cgi_headers(b"plain"), b"plain");
    }
}
