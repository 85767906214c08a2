//! Signatures proxy - pivots form-signature records into per-respondent JSON.
//!
//! This library backs both binaries (`signatures-proxy` and
//! `signatures-snapshot`) and exposes the core modules for integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod pivot;
pub mod publish;
pub mod server;
