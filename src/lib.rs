//! Webroot - Minimal HTTP/1.x origin server
//!
//! Serves files from a document root, runs dynamic pages through a CGI
//! interpreter, and optionally wraps connections in TLS.

pub mod config;
pub mod http;
pub mod logging;
pub mod resource;
pub mod server;
