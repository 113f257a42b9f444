//! hk-telemetry: housekeeping RTD telemetry tools for sounding-rocket ground support
//!
//! This crate decodes raw housekeeping RTD logs into per-chip temperature
//! streams and derives the series used for ground diagnostics.

pub mod common;
pub mod config;
pub mod decoder;
pub mod packet;
pub mod report;
pub mod session;
