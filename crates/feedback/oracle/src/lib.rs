#![deny(unsafe_code)]
//! # nolang-feedback-oracle
//!
//! Client for the NoLang toolchain oracle (`nolang hash | assemble | verify |
//! witness`) and the validation pipeline built on top of it.
//!
//! ```text
//!  candidate ──▶ normalize ──▶ hash? ──▶ patch ──▶ assemble ──▶ verify ──▶ witness
//!                                 │                    │                       │
//!                                 └── error: stop      └── error: stop         └── tally
//! ```
//!
//! ## Key Types
//!
//! - [`Oracle`] — capability interface over the external tool
//! - [`ProcessOracle`] — spawns the real `nolang` binary
//! - [`SimulatedOracle`] — scripted oracle for tests, no processes
//! - [`Validator`] — the six-step pipeline producing a `ValidationResult`
//! - [`BatchValidator`] — bounded worker pool, results in input order
//! - [`hash`] — placeholder normalization and positional hash patching

pub mod batch;
pub mod config;
pub mod error;
pub mod hash;
pub mod oracle;
pub mod process;
pub mod simulated;
pub mod validator;
pub mod witness;

pub use batch::{BatchItem, BatchValidator};
pub use config::OracleConfig;
pub use error::{OracleError, OracleResult};
pub use hash::{HashSlot, Patch, HASH_PLACEHOLDER};
pub use oracle::{Oracle, WitnessRun};
pub use process::ProcessOracle;
pub use simulated::SimulatedOracle;
pub use validator::Validator;
pub use witness::WitnessTally;
