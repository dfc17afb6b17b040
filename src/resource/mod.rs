//! Document root access
//!
//! This module maps parsed requests onto files under the configured root
//! directory and hands dynamic pages to an external CGI interpreter.

pub mod cgi;
pub mod resolver;

pub use cgi::{CgiEnvironment, CgiInvoker};
pub use resolver::ResourceResolver;

use crate::http::response::StatusCode;

/// Outcome of resolving a request against the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Content to send back
    pub body: Vec<u8>,
    /// Status decided by the resolver; `None` leaves the parse status in charge
    pub status: Option<StatusCode>,
}

impl Resolution {
    pub fn ok(body: Vec<u8>) -> Self {
        Self { body, status: None }
    }

    pub fn with_status(body: Vec<u8>, status: StatusCode) -> Self {
        Self {
            body,
            status: Some(status),
        }
    }

    /// An empty 500 answer.
    pub fn fault() -> Self {
        Self::with_status(Vec::new(), StatusCode::InternalServerError)
    }
}
