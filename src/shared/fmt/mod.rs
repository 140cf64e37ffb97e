//! Display formatting for amounts shown to the player.

pub mod decimal;
pub mod num;
