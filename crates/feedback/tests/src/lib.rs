//! Integration and property tests for the NoLang feedback loop.
//!
//! The suites live under `tests/`; this crate has no library surface.
