//! High-level commands called by the CLI frontend.

pub mod deploy;

pub use deploy::{DeployCommand, DeployReport, DescriptorReport};
