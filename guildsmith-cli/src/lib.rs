//! guildsmith-cli: binaries and platform plumbing for guildsmith.
//!
//! The reconciliation engine lives in guildsmith-core; this crate owns the
//! gateway session, guild snapshots, configuration, and the member export.

pub mod config;
pub mod export;
pub mod guild;
pub mod session;
pub mod setup;
