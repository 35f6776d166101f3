//! Monoforge - Monorepo-aware build and command orchestrator
//!
//! This library provides the core functionality for orchestrating builds and
//! arbitrary commands across a monorepo of interdependent packages, with
//! hash-based incremental rebuilds.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Graph construction, scheduling, and build logic
//! - [`infra`] - Infrastructure layer (filesystem, hashing, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
