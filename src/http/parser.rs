use std::fmt;

use crate::http::request::{Method, ParsedRequest, SUPPORTED_VERSIONS, split_target};
use crate::http::response::StatusCode;

/// Structural failures that stop parsing early.
///
/// Validation problems (unknown method, unsupported version, missing
/// length) are not errors here; they only degrade the request status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The request line did not have exactly three tokens
    MalformedRequestLine,
    /// A header line had no `": "` separator
    MalformedHeader,
    /// Content-Length was not a number
    InvalidContentLength,
}

impl ParseError {
    /// Status reported to the client when this error aborts parsing.
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::MalformedRequestLine | ParseError::MalformedHeader => {
                StatusCode::BadRequest
            }
            ParseError::InvalidContentLength => StatusCode::InternalServerError,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedRequestLine => f.write_str("malformed request line"),
            ParseError::MalformedHeader => f.write_str("malformed header line"),
            ParseError::InvalidContentLength => f.write_str("invalid Content-Length"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a raw request buffer.
///
/// Never fails: structural problems are folded into the returned
/// request's `status`, together with whatever was parsed before them.
///
/// The buffer is split on every CR and every LF, so a CRLF yields an
/// empty element between two lines. Headers end at the first pair of
/// consecutive empty elements, which is what a CRLF CRLF produces.
pub fn parse_http_request(buf: &[u8]) -> ParsedRequest {
    let mut parser = Parser::new(buf);

    if let Err(e) = parser.run() {
        tracing::debug!(error = %e, "Request parsing aborted");
        parser.request.status = e.status();
    }

    parser.request
}

struct Parser<'a> {
    raw: &'a [u8],
    request: ParsedRequest,
    request_line_complete: bool,
    headers_complete: bool,
    previous_empty: bool,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a [u8]) -> Self {
        Self {
            raw,
            request: ParsedRequest::default(),
            request_line_complete: false,
            headers_complete: false,
            previous_empty: false,
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        let text = String::from_utf8_lossy(self.raw);

        for element in text.split(['\r', '\n']) {
            if !self.request_line_complete {
                if element.is_empty() {
                    continue;
                }
                self.parse_request_line(element)?;
            } else if !self.headers_complete {
                self.parse_header(element)?;
            } else {
                break;
            }
        }

        if self.headers_complete {
            self.parse_body()?;
        }

        Ok(())
    }

    fn parse_request_line(&mut self, line: &str) -> Result<(), ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let &[method, target, version] = tokens.as_slice() else {
            return Err(ParseError::MalformedRequestLine);
        };

        self.request.method = Method::from_str(method);
        if self.request.method.is_none() {
            self.request.status = StatusCode::NotImplemented;
            self.request.errors += 1;
        }

        self.request.version = version.to_string();
        if !SUPPORTED_VERSIONS.contains(&version) {
            self.request.status = StatusCode::HttpVersionNotSupported;
            self.request.errors += 1;
        }

        let (host, port, query) = split_target(target);
        self.request.target = target.to_string();
        self.request.host = host;
        self.request.port = port;
        self.request.query = query;

        self.request_line_complete = true;
        Ok(())
    }

    fn parse_header(&mut self, line: &str) -> Result<(), ParseError> {
        if line.is_empty() {
            if self.previous_empty {
                self.headers_complete = true;
            }
            self.previous_empty = true;
            return Ok(());
        }
        self.previous_empty = false;

        let (name, value) = line
            .split_once(": ")
            .ok_or(ParseError::MalformedHeader)?;

        self.request
            .headers
            .entry(name.to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());

        Ok(())
    }

    // The body is the tail of the whole buffer, not the bytes following
    // the header block.
    fn parse_body(&mut self) -> Result<(), ParseError> {
        if let Some(length) = self.request.header("Content-Length") {
            let length = length
                .trim()
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?;
            let start = self.raw.len().saturating_sub(length);
            self.request.body = self.raw[start..].to_vec();
        } else if self.request.method == Some(Method::POST) {
            self.request.status = StatusCode::LengthRequired;
        }

        Ok(())
    }
}
