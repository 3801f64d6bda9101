//! guildsmith-core: the channel-provisioning reconciliation engine.
//!
//! Turns a tabular desired set into idempotent, rate-paced channel creation
//! against a platform boundary the caller supplies:
//! - input: CSV rows → desired channels
//! - resolve: raw user identifiers → roster members
//! - engine: diff desired against existing, create only what's missing
//! - pace: fixed delay between creation calls

pub mod engine;
pub mod input;
pub mod pace;
pub mod resolve;
pub mod types;
