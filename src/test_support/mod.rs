//! Test utilities shared across crate-level unit tests.

pub mod http;
