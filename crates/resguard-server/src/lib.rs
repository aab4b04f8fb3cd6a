//! resguard reference server.
//!
//! Wires strict YAML configuration, an in-memory data store, an allowlist
//! policy and conventional resource routing around the `resguard-core`
//! pipeline, and exposes it over HTTP. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod http;
pub mod policy;
pub mod routing;
pub mod store;
