//! The `utils` module provides shared definitions used across the `sendqueue`
//! server: the error types and the logging bootstrap.

pub mod error;
pub mod logging;
