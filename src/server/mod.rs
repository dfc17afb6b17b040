//! Network front end: the accept loop and the TLS policy.

pub mod listener;
pub mod tls;

pub use listener::Listener;
