//! Middleware applied to every request.
//!
//! - `validation`: early rejection of path traversal and oversized bodies
//! - `security_headers`: hardening headers and per-content-type caching policy

pub mod security_headers;
pub mod validation;
