//! Backend for the calendar app: JWT auth, per-user events and settings
//! over Postgres, with in-memory stores for development and tests.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod settings;
pub mod state;
