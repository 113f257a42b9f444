//! Shared infrastructure for housekeeping tools
//!
//! Error aggregation and CLI argument building blocks.

pub mod cli;
pub mod error;

pub use cli::{CommonArgs, DecodeArgs};
pub use error::{HkError, HkResult};
