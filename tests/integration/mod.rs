//! Integration tests for nodeshell.

pub mod cli_test;
pub mod dispatch_test;
pub mod target_test;
