//! Core domain types
//!
//! These types mirror what the generation API returns and are shared
//! between the HTTP client, the job poller and the CLI.

pub mod billing;
pub mod generation;
pub mod job;
