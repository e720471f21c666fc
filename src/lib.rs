//! nodeshell - An in-process command interpreter with typed commands and method
//! chaining on live host objects.
//!
//! This library exposes the core modules for embedding and for integration tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod interpreter;
pub mod logging;
pub mod target;
