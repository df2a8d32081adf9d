//! id-verify library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod camera;
pub mod config;
pub mod gemini;
pub mod workflow;
