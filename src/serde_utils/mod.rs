//! Custom serialization/deserialization utilities
//!
//! This module provides helpers for tolerating the billing backend's
//! loosely-typed wire formats.

pub mod lenient_number;
