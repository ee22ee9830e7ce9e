//! Sizing service: HTTP hosting for the sizing engines

pub mod api;
pub mod config;
pub mod health;
