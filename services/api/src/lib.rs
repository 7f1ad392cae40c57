//! services/api/src/lib.rs
//!
//! Library crate for the API service. The binaries in `src/bin` assemble the
//! pieces exposed here.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
