//! `tabgroup` crate (library surface).
//!
//! The primary entrypoint for end users is the `tabgroup` binary (HTTP
//! server + CLI). This library module exists so integration tests and
//! embedders can build the router without going through the binary.

pub mod server;

pub use tabgroup_core as core;
