//! Core orchestration logic
//!
//! # Submodules
//!
//! - [`manifest`] - Package manifest (package.json) parsing
//! - [`graph`] - Dependency graph construction and cycle detection
//! - [`scheduler`] - Execution modes, leveling, and plan computation
//! - [`executor`] - Plan execution and command entry points
//! - [`builder`] - Incremental build orchestration

pub mod builder;
pub mod executor;
pub mod graph;
pub mod manifest;
pub mod scheduler;
