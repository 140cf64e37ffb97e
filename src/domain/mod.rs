//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: Rich domain types
//! - `wire.rs`: Raw serde structs matching backend payloads
//! - `convert.rs`: Conversions from wire to domain types (where needed)
//! - `state.rs`: State containers with update methods (for push-driven data)
//! - `client.rs`: Sub-client with HTTP methods (`http` feature)

pub mod account;
pub mod leaderboard;
pub mod market;
pub mod trade;
