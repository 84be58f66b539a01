//! services/api/src/lib.rs
//!
//! Library root for the `api` service: adapters for the core ports, the
//! configuration loader, the service error type, and the web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;

#[cfg(test)]
pub mod testing;
