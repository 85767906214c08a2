//! Integration tests for the signatures proxy.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable to run them.

pub mod connection_test;
pub mod fixture;
pub mod service_test;
