use std::fmt;

use crate::http::request::{Method, ParsedRequest};
use crate::resource::Resolution;

/// Media type of every response the server produces.
pub const CONTENT_TYPE: &str = "text/html";

/// HTTP status codes produced by the server.
///
/// Parse-level codes:
/// - `BadRequest` (400): Malformed request line or header
/// - `LengthRequired` (411): POST without Content-Length
/// - `NotImplemented` (501): Unknown method
/// - `HttpVersionNotSupported` (505): Version other than HTTP/1.0 or HTTP/1.1
///
/// Resource-level codes:
/// - `Created` (201): PUT stored the resource
/// - `Forbidden` (403): Permission denied on the document root
/// - `NotFound` (404): No such resource
/// - `InternalServerError` (500): Unexpected failure anywhere in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 411 Length Required
    LengthRequired,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
    /// 505 HTTP Version Not Supported
    HttpVersionNotSupported,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::LengthRequired.as_u16(), 411);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::LengthRequired => 411,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::LengthRequired => "Length Required",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Headers keep their insertion order, which is the order they go out on
/// the wire. A `None` body means the payload section is omitted entirely
/// (HEAD and DELETE), even though Content-Length may be non-zero.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers in emission order
    pub headers: Vec<(String, String)>,
    /// Response body, if one is sent
    pub body: Option<Vec<u8>>,
}

impl Response {
    /// Looks up a header value by exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body(b"<p>hi</p>".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a header, replacing the value of an existing one in place.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();

        match self.headers.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the final Response.
    ///
    /// Adds a Content-Length header based on body size if none was set.
    pub fn build(mut self) -> Response {
        if !self.headers.iter().any(|(name, _)| name == "Content-Length") {
            let length = self.body.as_ref().map_or(0, Vec::len);
            self.headers
                .push(("Content-Length".to_string(), length.to_string()));
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

/// Combines a parsed request with the resolver's outcome.
///
/// A status reported by the resolver wins over the parse status, so a
/// server fault always surfaces as 500.
pub fn build_response(request: &ParsedRequest, resolution: Resolution) -> Response {
    let status = resolution.status.unwrap_or(request.status);
    let mut builder = ResponseBuilder::new(status);

    if request.method == Some(Method::PUT) {
        builder = builder.header("Location", request.host.as_str());
    }

    let content_length = if request.method == Some(Method::DELETE) {
        0
    } else {
        resolution.body.len()
    };

    builder = builder
        .header("Content-Length", content_length.to_string())
        .header("Content-Type", CONTENT_TYPE);

    if request.expects_body() {
        builder = builder.body(resolution.body);
    }

    builder.build()
}
