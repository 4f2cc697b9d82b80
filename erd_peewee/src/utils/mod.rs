//! Utilities for erd_peewee
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;
pub mod writer;

// Re-export key utility functions
pub use naming::{default_end_name, pluralize, python_string};
pub use writer::CodeWriter;
