//! Utility functions.
//!
//! Collection of helper functions used across the framework.

pub mod duration;

pub use duration::{format_compact, format_duration, parse_duration};
