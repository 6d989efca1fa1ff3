//! Command handlers.

pub mod chat;
pub mod config;
pub mod models;
