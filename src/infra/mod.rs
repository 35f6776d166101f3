//! Infrastructure layer
//!
//! Handles filesystem walking, content hashing, and external processes.

pub mod discovery;
pub mod hasher;
pub mod process;
