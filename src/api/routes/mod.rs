//! API Route Handlers

pub mod connections;
pub mod health;
