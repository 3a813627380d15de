//! # mis
//!
//! The school MIS application: HTTP API, CLI and configuration around the
//! `mis-core` evaluation engine.

pub mod api;
pub mod cli;
pub mod config;
