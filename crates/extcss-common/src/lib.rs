//! Common utilities for the extcss engine.
//!
//! This crate provides shared infrastructure used by all extcss components:
//! - **Warning System** - deduplicated, colored terminal output for skipped
//!   rules and unsupported input

pub mod warning;
