//! Integration tests for catalog-refresh
//!
//! These tests use wiremock to serve a small catalog and run the pipeline
//! end-to-end against a SQLite database in a temporary directory.

mod config_tests;
mod pipeline_tests;
