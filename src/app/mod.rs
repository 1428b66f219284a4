//! Application service shared by the HTTP API and the CLI.

pub mod ports;
pub mod service;

pub use ports::SpecsReader;
pub use service::{Health, Service};
