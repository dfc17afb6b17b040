use std::collections::HashMap;

use crate::http::response::StatusCode;

/// HTTP request methods.
///
/// Only the methods the server knows how to serve are representable. Any
/// other token on the request line leaves [`ParsedRequest::method`] empty
/// and the request is answered with 501 Not Implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Submit data, usually to a dynamic page
    POST,
    /// PUT - Create or overwrite a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation of the method (case-sensitive, uppercase)
    ///
    /// # Returns
    ///
    /// `Some(Method)` if the string matches a known method, `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// # use webroot::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// assert_eq!(Method::from_str("PATCH"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
        }
    }
}

/// Protocol versions accepted on the request line.
pub const SUPPORTED_VERSIONS: [&str; 2] = ["HTTP/1.0", "HTTP/1.1"];

/// A request as seen by the rest of the pipeline.
///
/// Built once per inbound buffer by [`crate::http::parser::parse_http_request`]
/// and never mutated afterwards. Validation problems do not abort parsing;
/// they are recorded in `status` and `errors` so the server can still
/// answer with a well-formed response.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// The HTTP method, `None` when the token was not recognised
    pub method: Option<Method>,
    /// The request-line URI, before splitting
    pub target: String,
    /// Path component of the target, used to locate the resource
    pub host: String,
    /// Text after the first `:` of the target, if any
    pub port: Option<String>,
    /// Text after the first `?` of the target, empty when absent
    pub query: String,
    /// Protocol version token (e.g. "HTTP/1.1")
    pub version: String,
    /// Request headers; repeated names are joined with a comma
    pub headers: HashMap<String, String>,
    /// Request body, sized by Content-Length
    pub body: Vec<u8>,
    /// Parse status, `Ok` unless validation failed
    pub status: StatusCode,
    /// Number of method/version validation failures
    pub errors: u32,
}

impl Default for ParsedRequest {
    fn default() -> Self {
        Self {
            method: None,
            target: String::new(),
            host: String::new(),
            port: None,
            query: String::new(),
            version: String::new(),
            headers: HashMap::new(),
            body: Vec::new(),
            status: StatusCode::Ok,
            errors: 0,
        }
    }
}

impl ParsedRequest {
    /// Retrieves a header value by name, ignoring ASCII case.
    ///
    /// # Arguments
    ///
    /// * `key` - Header name to look up
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the header value if present, `None` otherwise.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(key)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(key))
                    .map(|(_, value)| value)
            })
            .map(|v| v.as_str())
    }

    /// Whether the method is one whose response carries a body.
    pub fn expects_body(&self) -> bool {
        !matches!(self.method, Some(Method::HEAD) | Some(Method::DELETE))
    }
}

/// Splits a request target into host, port and query string.
///
/// The query is everything after the first `?` (empty if there is none).
/// In the part before it, a `:` separates the host from the port.
///
/// ```
/// # use webroot::http::request::split_target;
/// assert_eq!(
///     split_target("/page:8080?a=1"),
///     ("/page".to_string(), Some("8080".to_string()), "a=1".to_string())
/// );
/// assert_eq!(split_target("/page"), ("/page".to_string(), None, String::new()));
/// ```
pub fn split_target(target: &str) -> (String, Option<String>, String) {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };

    let (host, port) = match path.split_once(':') {
        Some((host, port)) => (host, Some(port.to_string())),
        None => (path, None),
    };

    (host.to_string(), port, query.to_string())
}

/// Builder for constructing `ParsedRequest` values directly.
///
/// Useful when a request does not come off the wire, e.g. in tests.
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<ParsedRequest, &'static str> {
        let method = self.method.ok_or("method missing")?;
        let target = self.target.ok_or("target missing")?;
        let (host, port, query) = split_target(&target);

        Ok(ParsedRequest {
            method: Some(method),
            target,
            host,
            port,
            query,
            version: "HTTP/1.1".to_string(),
            headers: self.headers,
            body: self.body,
            status: StatusCode::Ok,
            errors: 0,
        })
    }
}
