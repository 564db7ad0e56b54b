//! Parser integration tests
//!
//! Tests for:
//! - Statement dispatch and block handling
//! - Diagnostics for malformed input
//! - Timestamp conventions
//! - Format detection

pub mod tlog_tests;
