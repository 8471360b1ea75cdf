//! Library crate for bulls-cows-back, exposing modules for binaries and integration tests.

pub mod config;
pub mod dto;
pub mod error;
pub mod logic;
pub mod routes;
pub mod services;
pub mod state;
