//! Wire-facing payload types and their validation.

pub mod health;
pub mod validation;
pub mod ws;
