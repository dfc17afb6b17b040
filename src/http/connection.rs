use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::parser::parse_http_request;
use crate::http::request::ParsedRequest;
use crate::http::response::{Response, build_response};
use crate::http::writer::ResponseWriter;
use crate::resource::{Resolution, ResourceResolver};

/// Upper bound for a single request read. Longer requests are truncated.
pub const READ_BUFFER_SIZE: usize = 8192;

pub struct Connection<S> {
    stream: S,
    resolver: Arc<ResourceResolver>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Bytes),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, resolver: Arc<ResourceResolver>) -> Self {
        Self {
            stream,
            resolver,
            state: ConnectionState::Reading,
        }
    }

    /// Serves exactly one request, then closes.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(raw) => {
                        self.state = ConnectionState::Processing(raw);
                    }
                    None => {
                        self.state = ConnectionState::Closed;
                    }
                },

                ConnectionState::Processing(raw) => {
                    let response = respond(&self.resolver, raw).await;
                    let writer = ResponseWriter::new(&response);
                    tracing::debug!(
                        response = %String::from_utf8_lossy(writer.bytes()),
                        "Response"
                    );
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    self.stream.shutdown().await.ok();
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads once, up to [`READ_BUFFER_SIZE`] bytes. `None` if the peer
    /// closed without sending anything.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Bytes>> {
        let mut buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);
        let n = (&mut self.stream)
            .take(READ_BUFFER_SIZE as u64)
            .read_buf(&mut buffer)
            .await?;

        if n == 0 {
            return Ok(None);
        }

        Ok(Some(buffer.freeze()))
    }
}

/// Runs one raw request through parse, resolve and build.
///
/// Resolver failures become a 500 response; nothing escapes this function.
pub async fn respond(resolver: &ResourceResolver, raw: &[u8]) -> Response {
    let request = parse_http_request(raw);
    log_request(raw, &request);

    let resolution = match resolver.resolve(&request).await {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::error!(
                error = %format!("{:#}", e),
                target = %request.target,
                "Failed to resolve request"
            );
            Resolution::fault()
        }
    };

    build_response(&request, resolution)
}

fn log_request(raw: &[u8], request: &ParsedRequest) {
    let text = String::from_utf8_lossy(raw);
    let request_line = text.split("\r\n").next().unwrap_or_default();

    tracing::info!("Incoming request - {}", request_line);
    tracing::debug!("Request\n{}", text);
    tracing::debug!(
        version = %request.version,
        method = ?request.method,
        uri = %request.target,
        headers = request.headers.len(),
        body = %String::from_utf8_lossy(&request.body),
        status = %request.status,
        errors = request.errors,
        "Parsed request"
    );
}
