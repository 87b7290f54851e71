//! HTTP API for the availability and schedule synchronization services.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;
