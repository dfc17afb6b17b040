//! HTTP protocol implementation.
//!
//! One request per connection: the server reads a single bounded buffer,
//! answers it, and closes.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Turns a raw buffer into a [`request::ParsedRequest`]
//! - **`request`**: Request representation, methods and target splitting
//! - **`response`**: Status codes, the response builder and status reconciliation
//! - **`writer`**: Serializes and writes responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← One read, at most 8192 bytes
//!        └──────┬──────┘
//!               │ Bytes received (EOF → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Parse, resolve, build
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use webroot::http::connection::Connection;
//! use webroot::resource::{CgiInvoker, ResourceResolver};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let resolver = Arc::new(ResourceResolver::new("./www", CgiInvoker::new("php-cgi")));
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let resolver = Arc::clone(&resolver);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, resolver);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
