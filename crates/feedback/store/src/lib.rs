#![deny(unsafe_code)]
//! # nolang-feedback-store
//!
//! Persistence for the feedback loop: JSON Lines record streams and pretty
//! JSON documents.
//!
//! Required inputs that do not exist are fatal ([`StoreError::MissingInput`]);
//! individual malformed lines are not, and are counted in the [`LoadReport`].
//!
//! ## Key Types
//!
//! - [`read_records`] / [`write_records`] — typed JSONL streams
//! - [`read_dir_records`] — every file of one extension in a directory
//! - [`read_json`] / [`write_json`] — metric sets and reports

pub mod error;
pub mod json;
pub mod jsonl;

pub use error::{StoreError, StoreResult};
pub use json::{read_json, write_json};
pub use jsonl::{
    list_files, read_dir_records, read_records, read_records_if_exists, write_records, LoadReport,
};
