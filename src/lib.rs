//! Logistics admin dashboard library
//!
//! This library provides the core functionality for the dashboard daemon.
//! The binary entry point is in main.rs.

pub mod config;
pub mod db;
pub mod listing;
pub mod orders;
pub mod routes;
pub mod server;
pub mod sessions;
mod sql;
pub mod supabase;
pub mod templates;
pub mod users;
