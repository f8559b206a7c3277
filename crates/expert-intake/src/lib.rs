//! Client-side core of the expert application wizard.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
