//! CLI library components for the image authenticity checker.

pub mod logging;
pub mod report;
pub mod settings;
