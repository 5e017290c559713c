//! Database access layer.
//!
//! This module provides database access functionality:
//! - Single-connection lifecycle management
//! - Driver attributes applied as session settings
//! - Positional parameter binding
//! - Row decoding and fetch-style shaping

pub mod attributes;
pub mod connection;
pub mod manager;
pub mod params;
pub mod types;

pub use connection::DbConnection;
pub use manager::DatabaseManager;
